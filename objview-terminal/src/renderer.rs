/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix3, Matrix4, Vector3};
use objview_core::{projection::project_to_screen, Material};
use std::io::Write;

use crate::buffer::MeshBuffers;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Light direction in view space, pointing towards the viewer
const LIGHT_DIR: Vector3<f32> = Vector3::new(0.0, 0.0, 1.0);

/// How triangles are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    #[default]
    Wireframe,
    Points,
    Fill,
}

impl PolygonMode {
    pub fn next(self) -> Self {
        match self {
            PolygonMode::Wireframe => PolygonMode::Points,
            PolygonMode::Points => PolygonMode::Fill,
            PolygonMode::Fill => PolygonMode::Wireframe,
        }
    }
}

type ScreenPoint = (f32, f32, f32);

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    tint: Option<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            tint: None,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Colour drawn characters with the material's diffuse colour, if it has one
    pub fn set_material(&mut self, material: &Material) {
        let kd = material.diffuse;
        self.tint = if kd.r == 0.0 && kd.g == 0.0 && kd.b == 0.0 {
            None
        } else {
            let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
            Some(Color::Rgb {
                r: channel(kd.r),
                g: channel(kd.g),
                b: channel(kd.b),
            })
        };
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    /// Character at a cell, mostly useful for inspecting a frame
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    pub fn render(
        &mut self,
        buffers: &MeshBuffers,
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
        mode: PolygonMode,
    ) {
        let mvp = projection * view * model;
        let normal_matrix: Matrix3<f32> = (view * model).fixed_view::<3, 3>(0, 0).into_owned();

        for triangle in 0..buffers.triangle_count() {
            let base = triangle * 3;
            let mut screen = [(0.0, 0.0, 0.0); 3];
            let mut visible = true;
            for (corner, slot) in screen.iter_mut().enumerate() {
                match buffers
                    .position(base + corner)
                    .and_then(|p| project_to_screen(&p, &mvp, self.width as u32, self.height as u32))
                {
                    Some(point) => *slot = point,
                    None => visible = false,
                }
            }
            // Triangle is clipped
            if !visible {
                continue;
            }

            let character = self.shade(buffers, base, &normal_matrix);
            match mode {
                PolygonMode::Fill => self.rasterize_triangle(&screen, character),
                PolygonMode::Wireframe => {
                    for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                        self.draw_line(screen[a], screen[b], character);
                    }
                }
                PolygonMode::Points => {
                    for point in screen {
                        self.plot(point, '@');
                    }
                }
            }
        }
    }

    /// Pick a ramp character from the averaged vertex normals
    fn shade(&self, buffers: &MeshBuffers, base: usize, normal_matrix: &Matrix3<f32>) -> char {
        let normal: Vector3<f32> = (0..3).filter_map(|corner| buffers.normal(base + corner)).sum();
        let normal = (normal_matrix * normal)
            .try_normalize(f32::EPSILON)
            .unwrap_or(LIGHT_DIR);
        let brightness = normal.dot(&LIGHT_DIR).abs().max(0.15);

        // Map brightness to character
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
        LUMINOSITY_RAMP[char_index]
    }

    fn plot(&mut self, (x, y, depth): ScreenPoint, character: char) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
        }
    }

    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, character: char) {
        let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            self.plot(
                (
                    from.0 + (to.0 - from.0) * t,
                    from.1 + (to.1 - from.1) * t,
                    from.2 + (to.2 - from.2) * t,
                ),
                character,
            );
        }
    }

    fn rasterize_triangle(&mut self, coords: &[ScreenPoint; 3], character: char) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) = barycentric(
                    (v0.0, v0.1),
                    (v1.0, v1.1),
                    (v2.0, v2.1),
                    (px, py),
                ) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.char_buffer[idx] = character;
                        }
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];

                // Color based on character intensity
                let color = match (c, self.tint) {
                    (' ', _) => Color::DarkGrey,
                    (_, Some(tint)) => tint,
                    ('.' | ':', None) => Color::DarkGrey,
                    ('-' | '=', None) => Color::Grey,
                    ('+' | '*', None) => Color::White,
                    ('#' | '%' | '@', None) => Color::Cyan,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use objview_core::{Camera, MeshOptions, Model, Projection, Transform};

    fn quad_buffers() -> MeshBuffers {
        let model = Model::from_obj_str(
            "v -1 -1 0\nv 1 -1 0\nv 1 1 0\nv -1 1 0\nf 1 2 3 4\n",
            MeshOptions::default(),
        )
        .unwrap();
        MeshBuffers::upload(model.triangles(), model.normals()).unwrap()
    }

    fn render(mode: PolygonMode) -> AsciiRenderer {
        let mut renderer = AsciiRenderer::new(40, 40);
        let camera = Camera::default();
        let projection = Projection::new(40, 40);
        renderer.render(
            &quad_buffers(),
            &Transform::identity(),
            &camera.view_matrix(),
            &projection.matrix(),
            mode,
        );
        renderer
    }

    fn drawn(renderer: &AsciiRenderer) -> usize {
        (0..renderer.height())
            .flat_map(|y| (0..renderer.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| renderer.cell(x, y) != Some(' '))
            .count()
    }

    #[test]
    fn test_fill_covers_center() {
        let renderer = render(PolygonMode::Fill);
        assert_ne!(renderer.cell(20, 20), Some(' '));
        assert_eq!(renderer.cell(0, 0), Some(' '));
    }

    #[test]
    fn test_modes_draw_less_than_fill() {
        let fill = drawn(&render(PolygonMode::Fill));
        let wire = drawn(&render(PolygonMode::Wireframe));
        let points = drawn(&render(PolygonMode::Points));
        assert!(points > 0 && points <= 4);
        assert!(wire > points);
        assert!(fill > wire);
    }

    #[test]
    fn test_clear_resets_frame() {
        let mut renderer = render(PolygonMode::Fill);
        renderer.clear();
        assert_eq!(drawn(&renderer), 0);
    }

    #[test]
    fn test_polygon_mode_cycle() {
        let mode = PolygonMode::default();
        assert_eq!(mode, PolygonMode::Wireframe);
        assert_eq!(mode.next().next().next(), mode);
    }

    #[test]
    fn test_draw_writes_every_cell() {
        let renderer = AsciiRenderer::new(3, 2);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\r\n"));
    }
}
