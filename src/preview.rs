use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use anyhow::{anyhow, bail};
use csgrs::mesh::Mesh;
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector2, Vector3};

/// `x y z r g b`, two vertices per segment.
pub const FLOATS_PER_VERTEX: usize = 6;

const LOW_COLOUR: [f32; 3] = [0.30, 0.55, 0.95];
const HIGH_COLOUR: [f32; 3] = [1.00, 0.70, 0.25];
const NEAR: f32 = 0.1;
const GRID_COLOUR: [f32; 3] = [0.35, 0.35, 0.38];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = [f32; 3]>) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self { min: Vector3::zeros(), max: Vector3::zeros() };
        };
        let first = Vector3::from(first);
        points.fold(Self { min: first, max: first }, |b, p| {
            let p = Vector3::from(p);
            Self { min: b.min.inf(&p), max: b.max.sup(&p) }
        })
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Radius of the bounding sphere.
    pub fn radius(&self) -> f32 {
        self.size().norm() * 0.5
    }
}

#[derive(Debug, Clone)]
pub struct PreviewModel {
    vertices: Vec<f32>,
    bounds: Bounds,
    triangles: usize,
}

impl PreviewModel {
    /// Parses an ASCII or binary STL.
    pub fn from_stl(bytes: &[u8]) -> anyhow::Result<Self> {
        let mesh = Mesh::<()>::from_stl(bytes, None).map_err(|e| anyhow!("could not read STL: {e}"))?;
        if mesh.polygons.is_empty() {
            bail!("the STL file contains no triangles");
        }
        Ok(Self::from_polygons(mesh.polygons.iter().map(|polygon| {
            polygon
                .vertices
                .iter()
                .map(|v| [v.pos.x as f32, v.pos.y as f32, v.pos.z as f32])
                .collect()
        })))
    }

    /// Builds the edge list of closed polygons, coloured by height.
    pub fn from_polygons(polygons: impl IntoIterator<Item = Vec<[f32; 3]>>) -> Self {
        let polygons: Vec<Vec<[f32; 3]>> = polygons.into_iter().filter(|p| p.len() >= 3).collect();
        let bounds = Bounds::from_points(polygons.iter().flatten().copied());
        let height = bounds.size().z.max(f32::EPSILON);

        let mut vertices = Vec::new();
        let mut triangles = 0;
        for polygon in &polygons {
            triangles += polygon.len() - 2;
            for (i, a) in polygon.iter().enumerate() {
                let b = &polygon[(i + 1) % polygon.len()];
                for p in [a, b] {
                    let t = (p[2] - bounds.min.z) / height;
                    vertices.extend_from_slice(p);
                    vertices.extend_from_slice(&lerp(LOW_COLOUR, HIGH_COLOUR, t));
                }
            }
        }

        Self { vertices, bounds, triangles }
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn triangles(&self) -> usize {
        self.triangles
    }

    pub fn segments(&self) -> usize {
        self.vertices.len() / (FLOATS_PER_VERTEX * 2)
    }
}

fn lerp(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t, a[2] + (b[2] - a[2]) * t]
}

/// Build-plate grid under the model, `spacing` mm apart, one cell of margin.
pub fn grid_vertices(bounds: &Bounds, spacing: f32) -> Vec<f32> {
    let mut out = Vec::new();
    if spacing <= 0.0 {
        return out;
    }
    let x0 = (bounds.min.x / spacing).floor() * spacing - spacing;
    let x1 = (bounds.max.x / spacing).ceil() * spacing + spacing;
    let y0 = (bounds.min.y / spacing).floor() * spacing - spacing;
    let y1 = (bounds.max.y / spacing).ceil() * spacing + spacing;
    let z = bounds.min.z;

    let mut push = |a: [f32; 3], b: [f32; 3]| {
        out.extend_from_slice(&a);
        out.extend_from_slice(&GRID_COLOUR);
        out.extend_from_slice(&b);
        out.extend_from_slice(&GRID_COLOUR);
    };
    let columns = ((x1 - x0) / spacing).round() as usize;
    for i in 0..=columns {
        let x = x0 + i as f32 * spacing;
        push([x, y0, z], [x, y1, z]);
    }
    let rows = ((y1 - y0) / spacing).round() as usize;
    for i in 0..=rows {
        let y = y0 + i as f32 * spacing;
        push([x0, y, z], [x1, y, z]);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Top,
    Front,
    Side,
    Iso,
}

impl View {
    pub const ALL: [View; 4] = [View::Iso, View::Top, View::Front, View::Side];

    pub fn label(self) -> &'static str {
        match self {
            View::Top => "Top",
            View::Front => "Front",
            View::Side => "Side",
            View::Iso => "Iso",
        }
    }

    fn rotation(self) -> UnitQuaternion<f32> {
        let front = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2);
        match self {
            View::Top => UnitQuaternion::identity(),
            View::Front => front,
            View::Side => UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -FRAC_PI_2) * front,
            View::Iso => {
                UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -0.96)
                    * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -FRAC_PI_4)
            }
        }
    }
}

/// Orbit camera looking at the model's centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub rotation: UnitQuaternion<f32>,
    /// Screen-space offset in points.
    pub pan: Vector2<f32>,
    /// Dolly factor: 1 = whole model in view, 2 = half the distance.
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self { rotation: View::Iso.rotation(), pan: Vector2::zeros(), zoom: 1.0 }
    }
}

impl Camera {
    pub const ZOOM_RANGE: std::ops::RangeInclusive<f32> = 0.05..=2.5;

    pub fn snap(&mut self, view: View) {
        *self = Self { rotation: view.rotation(), ..Self::default() };
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), dx * 0.01);
        let pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), dy * 0.01);
        self.rotation = yaw * pitch * self.rotation;
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan += Vector2::new(dx, dy);
    }

    pub fn zoom_by(&mut self, scroll: f32) {
        let zoom = self.zoom * (1.0 + scroll * 0.001);
        self.zoom = zoom.clamp(*Self::ZOOM_RANGE.start(), *Self::ZOOM_RANGE.end());
    }

    /// Model-view-projection for a viewport of `width` x `height` points.
    pub fn mvp(&self, bounds: &Bounds, width: f32, height: f32) -> Matrix4<f32> {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let radius = bounds.radius().max(1.0);
        // the eye never enters the bounding sphere
        let distance = (radius * 3.0 / self.zoom).max(radius + NEAR * 2.0);

        let proj = Matrix4::new_perspective(width / height, 60_f32.to_radians(), NEAR, distance + radius * 4.0);
        let view = Matrix4::look_at_rh(&Point3::new(0.0, 0.0, distance), &Point3::origin(), &Vector3::y());
        let model = self.rotation.to_homogeneous() * Matrix4::new_translation(&-bounds.center());
        // post-projection shift: moves the picture by `pan` points regardless of depth
        let pan = Matrix4::new_translation(&Vector3::new(
            2.0 * self.pan.x / width,
            -2.0 * self.pan.y / height,
            0.0,
        ));

        pan * proj * view * model
    }
}
