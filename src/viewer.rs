//! Decorative rotating body/skeleton figures for the landing screen.
//!
//! Each figure is a small point model (a sphere head over a cylinder torso)
//! spun about the vertical axis and projected through a perspective camera
//! into normalized canvas coordinates in `[-1, 1]`.

use std::f64::consts::TAU;
use ratatui::layout::Rect;
use tracing::debug;

/// Radians per animation frame
pub const ROTATION_STEP: f64 = 0.05;

const FOV_DEGREES: f64 = 75.0;
const CAMERA_Z: f64 = 5.0;
const NEAR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A figure as rings of points; consecutive points in a ring are joined
/// when drawn as wireframe.
#[derive(Debug, Clone)]
pub struct Figure {
    pub rings: Vec<Vec<Point3>>,
}

impl Figure {
    /// Head sphere (r=0.5, y=1.8) over a torso cylinder (r=0.7, h=1.5, y=0.5)
    pub fn humanoid(segments: usize) -> Self {
        let mut rings = Vec::new();
        rings.extend(sphere(0.5, 1.8, segments));
        rings.extend(cylinder(0.7, 1.5, 0.5, segments));
        Self { rings }
    }
}

fn ring(radius: f64, y: f64, segments: usize) -> Vec<Point3> {
    (0..segments)
        .map(|i| {
            let theta = TAU * i as f64 / segments as f64;
            Point3 {
                x: radius * theta.cos(),
                y,
                z: radius * theta.sin(),
            }
        })
        .collect()
}

fn sphere(radius: f64, center_y: f64, segments: usize) -> Vec<Vec<Point3>> {
    let bands = (segments / 4).max(2);
    (1..bands)
        .map(|b| {
            let phi = std::f64::consts::PI * b as f64 / bands as f64;
            ring(radius * phi.sin(), center_y + radius * phi.cos(), segments)
        })
        .collect()
}

fn cylinder(radius: f64, height: f64, center_y: f64, segments: usize) -> Vec<Vec<Point3>> {
    let bands = (segments / 8).max(2);
    (0..=bands)
        .map(|b| {
            let y = center_y - height / 2.0 + height * b as f64 / bands as f64;
            ring(radius, y, segments)
        })
        .collect()
}

/// Perspective camera looking down -z from `CAMERA_Z`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub aspect: f64,
}

impl Camera {
    /// Rotate about y, then project. Points behind the near plane are dropped.
    pub fn project(&self, p: Point3, rotation: f64) -> Option<(f64, f64)> {
        let (sin, cos) = rotation.sin_cos();
        let x = p.x * cos + p.z * sin;
        let z = -p.x * sin + p.z * cos;
        // Centre the figure vertically around its middle
        let y = p.y - 0.75;

        let depth = CAMERA_Z - z;
        if depth < NEAR {
            return None;
        }

        let focal = 1.0 / (FOV_DEGREES.to_radians() / 2.0).tan();
        Some((focal * x / (depth * self.aspect), focal * y / depth))
    }
}

/// One animated figure bound to a screen container
#[derive(Debug, Clone)]
pub struct Model {
    pub figure: Figure,
    pub camera: Camera,
    pub rotation: f64,
    spin: f64,
    container: Rect,
}

impl Model {
    fn new(figure: Figure, container: Rect, spin: f64) -> Self {
        Self {
            figure,
            camera: Camera {
                aspect: container_aspect(container),
            },
            rotation: 0.0,
            spin,
            container,
        }
    }

    pub fn projected_rings(&self) -> Vec<Vec<(f64, f64)>> {
        self.figure
            .rings
            .iter()
            .map(|r| {
                r.iter()
                    .filter_map(|p| self.camera.project(*p, self.rotation))
                    .collect()
            })
            .collect()
    }
}

/// Terminal cells are roughly twice as tall as wide
fn container_aspect(area: Rect) -> f64 {
    if area.height == 0 {
        1.0
    } else {
        area.width as f64 / (area.height as f64 * 2.0)
    }
}

/// Handle for the running viewer. The frame loop is driven by `tick` and
/// halts for good once `stop` is called.
#[derive(Debug)]
pub struct ViewerHandle {
    pub body: Model,
    pub skeleton: Model,
    running: bool,
}

impl ViewerHandle {
    pub fn init(body_container: Rect, skeleton_container: Rect) -> Self {
        debug!("model viewer initialised");
        Self {
            body: Model::new(Figure::humanoid(32), body_container, ROTATION_STEP),
            skeleton: Model::new(Figure::humanoid(16), skeleton_container, -ROTATION_STEP),
            running: true,
        }
    }

    /// Refit cameras when the containers change size
    pub fn on_resize(&mut self, body_container: Rect, skeleton_container: Rect) {
        for (model, area) in [
            (&mut self.body, body_container),
            (&mut self.skeleton, skeleton_container),
        ] {
            if model.container != area {
                model.container = area;
                model.camera.aspect = container_aspect(area);
            }
        }
    }

    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        for model in [&mut self.body, &mut self.skeleton] {
            model.rotation = (model.rotation + model.spin) % TAU;
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            debug!("model viewer stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
