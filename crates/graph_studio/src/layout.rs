//! Initial placement of file nodes on a circle.

use egui::Pos2;

use crate::label::NodeData;
use crate::model::{FileRef, GraphNode, Position};

/// Center of the seeded circle in canvas coordinates.
pub const LAYOUT_CENTER: Pos2 = Pos2::new(400.0, 300.0);

const BASE_RADIUS: f32 = 50.0;
const RADIUS_PER_NODE: f32 = 20.0;
const MAX_RADIUS: f32 = 200.0;

/// Radius grows with the node count and is capped at [`MAX_RADIUS`].
pub fn radial_radius(n: usize) -> f32 {
    (BASE_RADIUS + RADIUS_PER_NODE * n as f32).min(MAX_RADIUS)
}

/// Angle of node `i` out of `n`, in radians.
pub fn radial_angle(i: usize, n: usize) -> f32 {
    if n == 0 {
        return 0.0;
    }
    i as f32 / n as f32 * std::f32::consts::TAU
}

pub fn radial_positions(n: usize) -> Vec<Pos2> {
    let radius = radial_radius(n);
    (0..n)
        .map(|i| {
            let angle = radial_angle(i, n);
            Pos2::new(
                LAYOUT_CENTER.x + radius * angle.cos(),
                LAYOUT_CENTER.y + radius * angle.sin(),
            )
        })
        .collect()
}

/// One node per file: labelled with the file name, type on the second line.
pub fn seed_nodes(files: &[FileRef]) -> Vec<GraphNode> {
    files
        .iter()
        .zip(radial_positions(files.len()))
        .map(|(file, pos)| {
            let kind = file.file_type.trim();
            let subtitle = (!kind.is_empty()).then(|| kind.to_uppercase());
            GraphNode {
                id: file.id.to_string(),
                position: Position::from(pos),
                data: NodeData::new(file.name.clone(), subtitle),
                style: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileId;
    use proptest::prelude::*;

    fn file(id: &str, name: &str, kind: &str) -> FileRef {
        FileRef {
            id: FileId::new(id),
            name: name.to_string(),
            file_type: kind.to_string(),
            size: 10,
            uploaded_at: None,
        }
    }

    #[test]
    fn radius_grows_then_caps() {
        assert_eq!(radial_radius(1), 70.0);
        assert_eq!(radial_radius(5), 150.0);
        assert_eq!(radial_radius(7), 190.0);
        assert_eq!(radial_radius(8), 200.0);
        assert_eq!(radial_radius(100), 200.0);
    }

    #[test]
    fn seeds_label_and_uppercased_type() {
        let nodes = seed_nodes(&[file("f1", "sales.csv", "csv"), file("f2", "notes", "")]);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "f1");
        assert_eq!(nodes[0].data.display_text(), "sales.csv");
        assert_eq!(nodes[0].data.subtitle.as_deref(), Some("CSV"));
        assert_eq!(nodes[1].data.subtitle, None);
        // first node sits on the positive x axis
        assert_eq!(
            nodes[0].position,
            Position::new(f64::from(LAYOUT_CENTER.x + 90.0), f64::from(LAYOUT_CENTER.y))
        );
    }

    proptest! {
        #[test]
        fn nodes_are_evenly_spaced_on_one_circle(n in 1usize..64) {
            let positions = radial_positions(n);
            prop_assert_eq!(positions.len(), n);
            let expected_radius = radial_radius(n);
            let step = std::f32::consts::TAU / n as f32;
            for (i, p) in positions.iter().enumerate() {
                let d = *p - LAYOUT_CENTER;
                prop_assert!((d.length() - expected_radius).abs() < 1e-3);
                prop_assert!((radial_angle(i, n) - step * i as f32).abs() < 1e-4);
            }
            for i in 0..n {
                for j in (i + 1)..n {
                    prop_assert!(radial_angle(i, n) != radial_angle(j, n));
                }
            }
        }
    }
}
