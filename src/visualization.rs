//! 3D replay of recorded wells using kiss3d.

use kiss3d::prelude::*;

use blockout::grid::Size3;
use blockout::Cell;

use crate::demo::Snapshot;

/// Returns the display color for a catalog shape index.
///
/// The mapping is stable to keep colors consistent across snapshots.
fn shape_color(shape_index: u8) -> Color {
    match shape_index % 7 {
        0 => Color::new(1.0, 0.2, 0.2, 1.0), // red
        1 => Color::new(0.2, 1.0, 0.2, 1.0), // green
        2 => Color::new(0.2, 0.2, 1.0, 1.0), // blue
        3 => Color::new(1.0, 1.0, 0.2, 1.0), // yellow
        4 => Color::new(1.0, 0.2, 1.0, 1.0), // magenta
        5 => Color::new(0.2, 1.0, 1.0, 1.0), // cyan
        _ => Color::new(1.0, 0.6, 0.2, 1.0), // orange
    }
}

/// A rendered cube in the 3D scene.
struct RenderedCube {
    node: SceneNode3d,
    /// Horizontal position in world units.
    column: (f32, f32),
    /// Plane index counted up from the floor.
    level: f32,
}

/// Builds the scene for one snapshot.
///
/// Coordinate conventions:
/// - Board x maps to world X, board y to world Z.
/// - Board z grows toward the floor, so it maps to world -Y.
/// - The well is centered horizontally around the origin.
///
/// Cubes with no visible face cannot be seen and are skipped.
fn build_scene(scene: &mut SceneNode3d, size: Size3, cells: &[Cell]) -> Vec<RenderedCube> {
    /// Size of each rendered cube (slightly smaller than 1.0 for visible gaps).
    const CUBE_SIZE: f32 = 0.9;

    let center_x = (size.x as f32 - 1.0) / 2.0;
    let center_y = (size.y as f32 - 1.0) / 2.0;

    let mut rendered_cubes = Vec::new();
    for (index, cell) in cells.iter().enumerate() {
        if !cell.is_solid() || cell.visible_face_count() == 0 {
            continue;
        }

        let x = index % size.x;
        let y = (index / size.x) % size.y;
        let z = index / (size.x * size.y);

        let column = (x as f32 - center_x, y as f32 - center_y);
        let level = (size.z - 1 - z) as f32;
        let node = scene
            .add_cube(CUBE_SIZE, CUBE_SIZE, CUBE_SIZE)
            .set_color(shape_color(cell.shape_index()))
            .set_position(Vec3::new(column.0, level, column.1));
        rendered_cubes.push(RenderedCube {
            node,
            column,
            level,
        });
    }

    rendered_cubes
}

/// Displays all snapshots in an interactive 3D viewer.
pub fn display(snapshots: Vec<Snapshot>) {
    pollster::block_on(display_async(snapshots));
}

async fn display_async(snapshots: Vec<Snapshot>) {
    if snapshots.is_empty() {
        println!("No snapshots to display");
        return;
    }

    let num_snapshots = snapshots.len();
    let mut current_index = num_snapshots - 1;

    let title = |index: usize| {
        format!(
            "{} ({}/{}) - [Left/Right] navigate, [Up/Down] spread, [R] reset",
            snapshots[index].label,
            index + 1,
            num_snapshots
        )
    };

    let mut window = Window::new(&title(current_index)).await;

    let mut camera = OrbitCamera3d::default();
    camera.set_dist(20.0);

    let mut scene = SceneNode3d::empty();
    scene
        .add_light(Light::point(100.0))
        .set_position(Vec3::new(10.0, 15.0, 10.0));

    let snapshot = &snapshots[current_index];
    let mut rendered_cubes = build_scene(&mut scene, snapshot.size, &snapshot.cells);

    // extra vertical gap between planes (0.0 = packed)
    let mut spread: f32 = 0.0;
    const SPREAD_SPEED: f32 = 0.05;
    let mut needs_rebuild = false;

    loop {
        for event in window.events().iter() {
            if let kiss3d::event::WindowEvent::Key(key, action, _) = event.value {
                use kiss3d::event::{Action, Key};
                if action == Action::Press {
                    match key {
                        Key::Up => spread += SPREAD_SPEED,
                        Key::Down => spread = (spread - SPREAD_SPEED).max(0.0),
                        Key::R => spread = 0.0,
                        Key::Right => {
                            current_index = (current_index + 1) % num_snapshots;
                            needs_rebuild = true;
                        }
                        Key::Left => {
                            current_index =
                                current_index.checked_sub(1).unwrap_or(num_snapshots - 1);
                            needs_rebuild = true;
                        }
                        _ => {}
                    }
                }
            }
        }

        if needs_rebuild {
            for mut cube in rendered_cubes.drain(..) {
                cube.node.remove();
            }
            let snapshot = &snapshots[current_index];
            rendered_cubes = build_scene(&mut scene, snapshot.size, &snapshot.cells);
            window.set_title(&title(current_index));
            needs_rebuild = false;
        }

        for cube in &mut rendered_cubes {
            cube.node.set_position(Vec3::new(
                cube.column.0,
                cube.level * (1.0 + spread),
                cube.column.1,
            ));
        }

        if !window.render_3d(&mut scene, &mut camera).await {
            break;
        }
    }
}
