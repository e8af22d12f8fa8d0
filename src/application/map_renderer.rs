// Map renderer - Paints the rover's map region onto a fixed-size raster
use crate::domain::telemetry::{MapCell, MapData, Point};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
const PATH_COLOR: Rgba<u8> = Rgba([255, 255, 0, 255]);
const OBSTACLE_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const OBSTACLE_RADIUS: i64 = 2;

pub fn cell_color(cell: &MapCell) -> Rgba<u8> {
    match *cell {
        MapCell::Rgb([r, g, b]) => Rgba([r, g, b, 255]),
        MapCell::Intensity(v) => {
            let level = v.clamp(0.0, 255.0).round() as u8;
            Rgba([level, level, level, 255])
        }
    }
}

/// Paint `grid` (row-major) onto a `width` x `height` raster, nearest cell per pixel.
/// Pixels outside ragged rows stay black.
pub fn render_grid(grid: &[Vec<MapCell>], width: u32, height: u32) -> RgbaImage {
    let rows = grid.len();
    let cols = grid.iter().map(Vec::len).max().unwrap_or(0);
    if rows == 0 || cols == 0 {
        return RgbaImage::from_pixel(width, height, BACKGROUND);
    }

    RgbaImage::from_fn(width, height, |px, py| {
        let row = (py as usize * rows) / height as usize;
        let col = (px as usize * cols) / width as usize;
        grid[row].get(col).map(cell_color).unwrap_or(BACKGROUND)
    })
}

/// Affine mapping between raster pixels and map coordinates.
///
/// The rover exports the region centred on its position, clamped at the map
/// origin, with one grid cell per map unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapTransform {
    origin: Point,
    scale_x: f64,
    scale_y: f64,
}

impl MapTransform {
    pub fn new(origin: Point, scale_x: f64, scale_y: f64) -> Self {
        Self {
            origin,
            scale_x,
            scale_y,
        }
    }

    pub fn for_region(map: &MapData, region_size: u32, width: u32, height: u32) -> Self {
        let rows = map.map_region.len().max(1) as f64;
        let cols = map.map_region.iter().map(Vec::len).max().unwrap_or(0).max(1) as f64;
        let half = f64::from(region_size / 2);
        let anchor = map.robot_position;

        let origin = Point((anchor.x() - half).max(0.0), (anchor.y() - half).max(0.0));
        Self::new(origin, f64::from(width) / cols, f64::from(height) / rows)
    }

    pub fn to_pixel(&self, point: Point) -> (f64, f64) {
        (
            (point.x() - self.origin.x()) * self.scale_x,
            (point.y() - self.origin.y()) * self.scale_y,
        )
    }

    pub fn to_map(&self, px: f64, py: f64) -> Point {
        Point(
            self.origin.x() + px / self.scale_x,
            self.origin.y() + py / self.scale_y,
        )
    }
}

fn put_if_inside(image: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u64) < u64::from(image.width()) && (y as u64) < u64::from(image.height()) {
        image.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_line(image: &mut RgbaImage, from: (f64, f64), to: (f64, f64), color: Rgba<u8>) {
    let (x0, y0) = (from.0.round() as i64, from.1.round() as i64);
    let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);
    let steps = (x1 - x0).abs().max((y1 - y0).abs());
    if steps == 0 {
        put_if_inside(image, x0, y0, color);
        return;
    }

    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = x0 as f64 + (x1 - x0) as f64 * t;
        let y = y0 as f64 + (y1 - y0) as f64 * t;
        put_if_inside(image, x.round() as i64, y.round() as i64, color);
    }
}

/// Grid plus path history and obstacle overlays, redrawn from scratch
pub fn render_frame(map: &MapData, region_size: u32, width: u32, height: u32) -> RgbaImage {
    let mut image = render_grid(&map.map_region, width, height);
    let transform = MapTransform::for_region(map, region_size, width, height);

    for pair in map.path_history.windows(2) {
        draw_line(
            &mut image,
            transform.to_pixel(pair[0]),
            transform.to_pixel(pair[1]),
            PATH_COLOR,
        );
    }

    for obstacle in &map.obstacles {
        let (x, y) = transform.to_pixel(obstacle.position);
        let (cx, cy) = (x.round() as i64, y.round() as i64);
        for dy in -OBSTACLE_RADIUS..=OBSTACLE_RADIUS {
            for dx in -OBSTACLE_RADIUS..=OBSTACLE_RADIUS {
                put_if_inside(&mut image, cx + dx, cy + dy, OBSTACLE_COLOR);
            }
        }
    }

    image
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}
