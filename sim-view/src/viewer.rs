//! Interactive viewer for the 2D agent simulations, built with
//! eframe/egui.
//!
//! This module defines [`Viewer`], which owns the per-demo scene state
//! (agents, boids, particles, or a fluid grid), drives exactly one core
//! phase per displayed frame, and paints the resulting state. All
//! color-gradient mapping (pressure to RGB) lives here; the core only
//! exposes the raw physical quantities.

use eframe::App;
use glam::Vec2;
use sim_core::{
    agent::{Agent, AgentInit},
    boid::Boid,
    config::{BoundaryPolicy, FlockingParams},
    grid::FluidGrid,
    palette::Palette,
    particle::{Particle, ParticleInit},
    phases,
    types::Sprite,
};

/// Which simulation the central panel is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DemoMode {
    Brownian,
    Aggregation,
    Flocking,
    Swarm,
    Fireworks,
    PressureFlow,
}

impl DemoMode {
    const ALL: [DemoMode; 6] = [
        DemoMode::Brownian,
        DemoMode::Aggregation,
        DemoMode::Flocking,
        DemoMode::Swarm,
        DemoMode::Fireworks,
        DemoMode::PressureFlow,
    ];

    fn label(self) -> &'static str {
        match self {
            DemoMode::Brownian => "Brownian motion",
            DemoMode::Aggregation => "Diffusion-limited aggregation",
            DemoMode::Flocking => "Flocking",
            DemoMode::Swarm => "Particle swarm",
            DemoMode::Fireworks => "Fireworks",
            DemoMode::PressureFlow => "Pressure flow",
        }
    }
}

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` and enough time has passed, call [`Viewer::step_once`].
/// 3. Paint the scene's current state.
pub struct Viewer {
    mode: DemoMode,
    rng: rand::rngs::ThreadRng,
    palette: Palette,

    agents: Vec<Agent>,
    boids: Vec<Boid>,
    particles: Vec<Particle>,
    fluid: Option<FluidGrid>,

    /// Grid mass right after seeding, for the deviation readout.
    initial_mass: f64,
    /// Agents frozen by the last aggregation phase.
    last_stuck: usize,
    /// World position under the pointer, if any (swarm target).
    pointer_world: Option<Vec2>,

    // Scene parameters.
    grid_size: f32,
    agent_count: usize,
    boid_count: usize,
    particle_count: usize,
    stick_radius: f32,
    boundary: BoundaryPolicy,
    flocking: FlockingParams,
    max_speed: f32,
    gravity: f32,
    fluid_dim: usize,
    temperature_f: f32,
    molecular_weight: f32,
    dt: f32,
    seed_count: usize,
    seed_psig: f32,

    running: bool,
    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    pub fn new() -> Self {
        let mut viewer = Self {
            mode: DemoMode::Flocking,
            rng: rand::rng(),
            palette: Palette::default(),
            agents: Vec::new(),
            boids: Vec::new(),
            particles: Vec::new(),
            fluid: None,
            initial_mass: 0.0,
            last_stuck: 0,
            pointer_world: None,
            grid_size: 400.0,
            agent_count: 200,
            boid_count: 120,
            particle_count: 60,
            stick_radius: 4.0,
            boundary: BoundaryPolicy::Wrap,
            flocking: FlockingParams::default(),
            max_speed: 5.0,
            gravity: 0.05,
            fluid_dim: 40,
            temperature_f: 300.0,
            molecular_weight: 30.0,
            dt: 0.1,
            seed_count: 160,
            seed_psig: 300.0,
            running: false,
            step_interval: 0.03,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        };
        viewer.reset();
        viewer
    }

    /// Rebuilds the current demo's scene from its parameters.
    fn reset(&mut self) {
        self.agents.clear();
        self.boids.clear();
        self.particles.clear();
        self.fluid = None;
        self.last_stuck = 0;
        self.running = false;

        match self.mode {
            DemoMode::Brownian => {
                for id in 0..self.agent_count {
                    let init = AgentInit {
                        brownian: true,
                        ..AgentInit::default()
                    };
                    if let Ok(agent) =
                        Agent::new(self.grid_size, id, init, &self.palette, &mut self.rng)
                    {
                        self.agents.push(agent);
                    }
                }
            }

            DemoMode::Aggregation => {
                // A frozen seed in the middle; everything else diffuses.
                let center = self.grid_size / 2.0;
                let seed = AgentInit {
                    pos: Some(Vec2::new(center, center)),
                    radius: Some(2.0),
                    brownian: false,
                    ..AgentInit::default()
                };
                if let Ok(agent) = Agent::new(self.grid_size, 0, seed, &self.palette, &mut self.rng)
                {
                    self.agents.push(agent);
                }
                for id in 1..self.agent_count {
                    let init = AgentInit {
                        radius: Some(2.0),
                        brownian: true,
                        ..AgentInit::default()
                    };
                    if let Ok(agent) =
                        Agent::new(self.grid_size, id, init, &self.palette, &mut self.rng)
                    {
                        self.agents.push(agent);
                    }
                }
            }

            DemoMode::Flocking => {
                for id in 0..self.boid_count {
                    if let Ok(boid) = Boid::new(
                        self.grid_size,
                        id,
                        self.max_speed,
                        &self.flocking,
                        &self.palette,
                        &mut self.rng,
                    ) {
                        self.boids.push(boid);
                    }
                }
            }

            DemoMode::Swarm => {
                for id in 0..self.particle_count {
                    if let Ok(particle) = Particle::new(
                        self.grid_size,
                        id,
                        ParticleInit::default(),
                        &self.palette,
                        &mut self.rng,
                    ) {
                        self.particles.push(particle);
                    }
                }
            }

            DemoMode::Fireworks => {
                for id in 0..self.particle_count {
                    if let Ok(mut particle) = Particle::new(
                        self.grid_size,
                        id,
                        ParticleInit {
                            mass: Some(5.0),
                            ..ParticleInit::default()
                        },
                        &self.palette,
                        &mut self.rng,
                    ) {
                        launch(&mut particle, self.grid_size, &mut self.rng);
                        self.particles.push(particle);
                    }
                }
            }

            DemoMode::PressureFlow => {
                if let Ok(mut grid) = FluidGrid::new(
                    self.fluid_dim,
                    self.fluid_dim,
                    self.temperature_f,
                    self.molecular_weight,
                ) {
                    grid.seed_random(self.seed_count, self.seed_psig, &mut self.rng);
                    self.initial_mass = grid.total_mass();
                    self.fluid = Some(grid);
                }
            }
        }
    }

    /// Advances the current scene by a single step.
    fn step_once(&mut self) {
        match self.mode {
            DemoMode::Brownian => {
                phases::drift_phase(&mut self.agents, self.boundary, &mut self.rng);
            }

            DemoMode::Aggregation => {
                phases::drift_phase(&mut self.agents, self.boundary, &mut self.rng);
                self.last_stuck = phases::aggregation_phase(&mut self.agents, self.stick_radius);
            }

            DemoMode::Flocking => phases::flock_phase(&mut self.boids),

            DemoMode::Swarm => {
                let center = Vec2::splat(self.grid_size / 2.0);
                let target = self.pointer_world.unwrap_or(center);
                phases::swarm_phase(&mut self.particles, target);
            }

            DemoMode::Fireworks => {
                phases::fireworks_phase(&mut self.particles, self.gravity);
                let grid_size = self.grid_size;
                for p in &mut self.particles {
                    if p.pos.y > grid_size + 1.0 && p.vel.y > 0.0 {
                        launch(p, grid_size, &mut self.rng);
                    }
                }
            }

            DemoMode::PressureFlow => {
                if let Some(grid) = &mut self.fluid {
                    grid.step(self.dt);
                }
            }
        }
    }

    /// World extent of the current scene (fluid grids use cell units).
    fn world_size(&self) -> f32 {
        match self.mode {
            DemoMode::PressureFlow => self.fluid_dim as f32,
            _ => self.grid_size,
        }
    }

    fn world_to_screen(&self, p: Vec2, rect: egui::Rect, scale: f32) -> egui::Pos2 {
        egui::pos2(rect.min.x + p.x * scale, rect.min.y + p.y * scale)
    }

    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect, scale: f32) -> Vec2 {
        Vec2::new((p.x - rect.min.x) / scale, (p.y - rect.min.y) / scale)
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, timing).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("frame dt = ")
                        .range(0.005..=1.0)
                        .speed(0.005),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }
            });
        });
    }

    /// Builds the bottom status bar (timing plus per-mode readouts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                match self.mode {
                    DemoMode::Brownian => {
                        ui.label(format!("agents = {}", self.agents.len()));
                    }
                    DemoMode::Aggregation => {
                        let frozen = self.agents.iter().filter(|a| !a.brownian).count();
                        ui.label(format!("stuck last step = {}", self.last_stuck));
                        ui.label(format!(
                            "aggregated = {} / {}",
                            frozen,
                            self.agents.len()
                        ));
                    }
                    DemoMode::Flocking => {
                        ui.label(format!("boids = {}", self.boids.len()));
                    }
                    DemoMode::Swarm | DemoMode::Fireworks => {
                        ui.label(format!("particles = {}", self.particles.len()));
                    }
                    DemoMode::PressureFlow => {
                        if let Some(grid) = &self.fluid {
                            let mass = grid.total_mass();
                            ui.label(format!(
                                "mass deviation = {:+.2e} lb",
                                mass - self.initial_mass
                            ));
                            ui.label(format!("total mass = {mass:.3} lb"));
                        }
                    }
                }
            });
        });
    }

    /// Builds the right-hand configuration panel for the current demo.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");
                ui.separator();

                match self.mode {
                    DemoMode::Brownian | DemoMode::Aggregation => {
                        Self::labeled_drag_usize(
                            ui,
                            "agents:",
                            &mut self.agent_count,
                            1..=2000,
                            5.0,
                        );
                        Self::labeled_drag_f32(
                            ui,
                            "world size:",
                            &mut self.grid_size,
                            50.0..=1000.0,
                            10.0,
                        );
                        if self.mode == DemoMode::Aggregation {
                            Self::labeled_drag_f32(
                                ui,
                                "stick radius:",
                                &mut self.stick_radius,
                                1.0..=50.0,
                                0.5,
                            );
                        }
                    }

                    DemoMode::Flocking => {
                        Self::labeled_drag_usize(ui, "boids:", &mut self.boid_count, 2..=1000, 5.0);
                        Self::labeled_drag_f32(
                            ui,
                            "world size:",
                            &mut self.grid_size,
                            50.0..=1000.0,
                            10.0,
                        );
                        Self::labeled_drag_f32(
                            ui,
                            "max speed:",
                            &mut self.max_speed,
                            0.5..=20.0,
                            0.1,
                        );
                        Self::labeled_drag_f32(
                            ui,
                            "max force:",
                            &mut self.flocking.max_force,
                            0.01..=2.0,
                            0.01,
                        );
                        Self::labeled_drag_f32(
                            ui,
                            "perception:",
                            &mut self.flocking.perception_radius,
                            5.0..=200.0,
                            1.0,
                        );
                        ui.label("(weights apply on reset)");
                    }

                    DemoMode::Swarm | DemoMode::Fireworks => {
                        Self::labeled_drag_usize(
                            ui,
                            "particles:",
                            &mut self.particle_count,
                            1..=500,
                            2.0,
                        );
                        Self::labeled_drag_f32(
                            ui,
                            "world size:",
                            &mut self.grid_size,
                            50.0..=1000.0,
                            10.0,
                        );
                        if self.mode == DemoMode::Fireworks {
                            Self::labeled_drag_f32(
                                ui,
                                "gravity:",
                                &mut self.gravity,
                                0.001..=1.0,
                                0.005,
                            );
                        } else {
                            ui.label("Target follows the pointer.");
                        }
                    }

                    DemoMode::PressureFlow => {
                        Self::labeled_drag_usize(
                            ui,
                            "grid dim:",
                            &mut self.fluid_dim,
                            2..=150,
                            1.0,
                        );
                        Self::labeled_drag_f32(
                            ui,
                            "temperature degF:",
                            &mut self.temperature_f,
                            100.0..=500.0,
                            1.0,
                        );
                        Self::labeled_drag_f32(
                            ui,
                            "time step sec:",
                            &mut self.dt,
                            0.01..=1.0,
                            0.01,
                        );
                        Self::labeled_drag_usize(
                            ui,
                            "seeded cells:",
                            &mut self.seed_count,
                            1..=5000,
                            5.0,
                        );
                        Self::labeled_drag_f32(
                            ui,
                            "seed psig:",
                            &mut self.seed_psig,
                            10.0..=600.0,
                            5.0,
                        );
                        if let Some(grid) = &mut self.fluid {
                            // Live update: mass stays put, pressures shift.
                            if ui.button("Apply temperature").clicked() {
                                grid.set_temperature(self.temperature_f);
                            }
                        }
                    }
                }

                ui.separator();
                if ui.button("Rebuild scene").clicked() {
                    self.reset();
                }
            });
    }

    /// Builds the floating toolbar for choosing the demo.
    fn ui_toolbar(&mut self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("toolbar"))
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 40.0))
            .movable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(0, 0, 0, 32))
                    .show(ui, |ui| {
                        ui.vertical(|ui| {
                            for mode in DemoMode::ALL {
                                if ui
                                    .selectable_label(self.mode == mode, mode.label())
                                    .clicked()
                                    && self.mode != mode
                                {
                                    self.mode = mode;
                                    self.reset();
                                }
                            }
                        });
                    });
            });
    }

    fn paint_sprites<S: Sprite>(
        painter: &egui::Painter,
        sprites: &[S],
        rect: egui::Rect,
        scale: f32,
    ) {
        for s in sprites {
            let p = egui::pos2(
                rect.min.x + s.pos().x * scale,
                rect.min.y + s.pos().y * scale,
            );
            let [r, g, b] = s.color();
            painter.circle_filled(
                p,
                (s.radius() * scale).max(1.5),
                egui::Color32::from_rgb(r, g, b),
            );
        }
    }

    fn paint_fluid(&self, painter: &egui::Painter, rect: egui::Rect, scale: f32) {
        let Some(grid) = &self.fluid else {
            return;
        };
        for cell in grid.cells() {
            let min = egui::pos2(
                rect.min.x + cell.x as f32 * scale,
                rect.min.y + cell.y as f32 * scale,
            );
            let cell_rect =
                egui::Rect::from_min_size(min, egui::vec2(scale.ceil(), scale.ceil()));
            painter.rect_filled(
                cell_rect,
                egui::CornerRadius::ZERO,
                pressure_color(cell.gauge_psig(), self.seed_psig),
            );
        }
    }

    /// Builds the central panel where the scene is drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::hover());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            let world = self.world_size();
            let scale = (rect.width().min(rect.height()) / world).max(1e-6);

            self.pointer_world = response
                .hover_pos()
                .map(|p| self.screen_to_world(p, rect, scale));

            // World background and border.
            let world_rect = egui::Rect::from_min_size(
                rect.min,
                egui::vec2(world * scale, world * scale),
            );
            painter.rect_filled(
                world_rect,
                egui::CornerRadius::ZERO,
                egui::Color32::from_gray(12),
            );

            match self.mode {
                DemoMode::Brownian | DemoMode::Aggregation => {
                    Self::paint_sprites(&painter, &self.agents, rect, scale);
                }
                DemoMode::Flocking => {
                    Self::paint_sprites(&painter, &self.boids, rect, scale);
                }
                DemoMode::Swarm | DemoMode::Fireworks => {
                    Self::paint_sprites(&painter, &self.particles, rect, scale);
                }
                DemoMode::PressureFlow => self.paint_fluid(&painter, rect, scale),
            }

            // Swarm target marker.
            if self.mode == DemoMode::Swarm {
                let center = Vec2::splat(self.grid_size / 2.0);
                let target = self.pointer_world.unwrap_or(center);
                let p = self.world_to_screen(target, rect, scale);
                painter.circle_stroke(p, 6.0, egui::Stroke::new(1.5, egui::Color32::YELLOW));
            }

            // Auto-run if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }
                ctx.request_repaint();
            }
        });
    }
}

/// Re-launches a fireworks particle from the bottom of the world with a
/// fresh upward velocity.
fn launch(particle: &mut Particle, grid_size: f32, rng: &mut impl rand::Rng) {
    particle.pos = Vec2::new(grid_size * rng.random_range(0.3..0.7), grid_size);
    particle.vel = Vec2::new(
        rng.random_range(-1.5..1.5),
        rng.random_range(-6.0..-3.0),
    );
}

/// Maps a gauge pressure onto the 5-stop blue→yellow→green→orange→red
/// gradient, with `max_psig` pinned to the top stop.
fn pressure_color(gauge_psig: f32, max_psig: f32) -> egui::Color32 {
    const STOPS: [(f32, [f32; 3]); 5] = [
        (0.0, [135.0, 206.0, 235.0]),
        (25.0, [255.0, 255.0, 0.0]),
        (50.0, [0.0, 255.0, 0.0]),
        (75.0, [255.0, 165.0, 0.0]),
        (100.0, [255.0, 0.0, 0.0]),
    ];

    let percent = (gauge_psig / max_psig.max(1e-6) * 100.0).clamp(0.0, 100.0);
    let mut i = 0;
    while i < STOPS.len() - 2 && percent > STOPS[i + 1].0 {
        i += 1;
    }
    let (p0, c0) = STOPS[i];
    let (p1, c1) = STOPS[i + 1];
    let fraction = ((percent - p0) / (p1 - p0)).clamp(0.0, 1.0);

    egui::Color32::from_rgb(
        (c0[0] + (c1[0] - c0[0]) * fraction).round() as u8,
        (c0[1] + (c1[1] - c0[1]) * fraction).round() as u8,
        (c0[2] + (c1[2] - c0[2]) * fraction).round() as u8,
    )
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
        self.ui_toolbar(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_color_hits_the_gradient_stops() {
        assert_eq!(pressure_color(0.0, 300.0), egui::Color32::from_rgb(135, 206, 235));
        assert_eq!(pressure_color(300.0, 300.0), egui::Color32::from_rgb(255, 0, 0));
        // Halfway through the first segment: blue blending toward yellow.
        let mid = pressure_color(37.5, 300.0);
        assert_eq!(mid, egui::Color32::from_rgb(195, 231, 118));
    }

    #[test]
    fn pressure_color_clamps_out_of_range_inputs() {
        assert_eq!(pressure_color(-10.0, 300.0), pressure_color(0.0, 300.0));
        assert_eq!(pressure_color(900.0, 300.0), pressure_color(300.0, 300.0));
    }

    #[test]
    fn reset_builds_the_scene_for_each_mode() {
        let mut viewer = Viewer::new();
        for mode in DemoMode::ALL {
            viewer.mode = mode;
            viewer.reset();
            match mode {
                DemoMode::Brownian | DemoMode::Aggregation => {
                    assert_eq!(viewer.agents.len(), viewer.agent_count);
                    assert!(viewer.boids.is_empty());
                }
                DemoMode::Flocking => {
                    assert_eq!(viewer.boids.len(), viewer.boid_count);
                }
                DemoMode::Swarm | DemoMode::Fireworks => {
                    assert_eq!(viewer.particles.len(), viewer.particle_count);
                }
                DemoMode::PressureFlow => {
                    let grid = viewer.fluid.as_ref().unwrap();
                    assert_eq!(grid.width(), viewer.fluid_dim);
                    assert!(viewer.initial_mass > 0.0);
                }
            }
            assert!(!viewer.running);
        }
    }

    #[test]
    fn step_once_advances_without_panicking_in_every_mode() {
        let mut viewer = Viewer::new();
        for mode in DemoMode::ALL {
            viewer.mode = mode;
            viewer.reset();
            for _ in 0..3 {
                viewer.step_once();
            }
        }
    }

    #[test]
    fn pressure_flow_steps_conserve_mass_through_the_viewer() {
        let mut viewer = Viewer::new();
        viewer.mode = DemoMode::PressureFlow;
        viewer.fluid_dim = 10;
        viewer.seed_count = 5;
        viewer.reset();
        for _ in 0..20 {
            viewer.step_once();
        }
        let grid = viewer.fluid.as_ref().unwrap();
        assert!((grid.total_mass() - viewer.initial_mass).abs() < 1e-3);
    }
}
