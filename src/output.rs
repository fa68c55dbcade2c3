// VTK polydata (.vtp) output: one polyline per root, with per-root cell data.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::system::RootSystem;

/// Writes the architecture as an ASCII .vtp file, creating parent
/// directories as needed.
pub fn write_vtp(system: &RootSystem, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
    }
    let document = render_vtp(system);
    fs::write(path, document).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Branching order per root: 0 for base roots, parent's order + 1 below.
/// Parents always precede their laterals in the arena.
fn branching_orders(system: &RootSystem) -> Vec<usize> {
    let mut orders = vec![0usize; system.roots.len()];
    for (i, root) in system.roots.iter().enumerate() {
        if let Some(parent) = root.parent {
            orders[i] = orders[parent] + 1;
        }
    }
    orders
}

fn render_vtp(system: &RootSystem) -> String {
    // only roots that already form a segment become line cells
    let lines: Vec<_> = system.roots.iter().filter(|r| r.nodes.len() >= 2).collect();
    let orders = branching_orders(system);
    let line_orders: Vec<_> = system
        .roots
        .iter()
        .zip(&orders)
        .filter(|(r, _)| r.nodes.len() >= 2)
        .map(|(_, order)| *order)
        .collect();
    let point_count = system.node_count();

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\"?>\n");
    out.push_str("<VTKFile type=\"PolyData\" version=\"0.1\" byte_order=\"LittleEndian\">\n");
    out.push_str("<PolyData>\n");
    let _ = writeln!(
        out,
        "<Piece NumberOfPoints=\"{}\" NumberOfLines=\"{}\">",
        point_count,
        lines.len()
    );

    out.push_str("<Points>\n");
    out.push_str("<DataArray type=\"Float64\" NumberOfComponents=\"3\" format=\"ascii\">\n");
    for root in &system.roots {
        for node in &root.nodes {
            let _ = writeln!(out, "{} {} {}", node.x, node.y, node.z);
        }
    }
    out.push_str("</DataArray>\n</Points>\n");

    // global point index of each root's first node
    let mut first_index = Vec::with_capacity(system.roots.len());
    let mut next = 0usize;
    for root in &system.roots {
        first_index.push(next);
        next += root.nodes.len();
    }

    out.push_str("<Lines>\n");
    out.push_str("<DataArray type=\"Int64\" Name=\"connectivity\" format=\"ascii\">\n");
    for (i, root) in system.roots.iter().enumerate() {
        if root.nodes.len() < 2 {
            continue;
        }
        let start = first_index[i];
        for j in 0..root.nodes.len() {
            let _ = write!(out, "{} ", start + j);
        }
        out.push('\n');
    }
    out.push_str("</DataArray>\n");
    out.push_str("<DataArray type=\"Int64\" Name=\"offsets\" format=\"ascii\">\n");
    let mut offset = 0usize;
    for root in &lines {
        offset += root.nodes.len();
        let _ = write!(out, "{} ", offset);
    }
    out.push('\n');
    out.push_str("</DataArray>\n</Lines>\n");

    out.push_str("<CellData>\n");
    let _ = writeln!(
        out,
        "<DataArray type=\"Float64\" Name=\"type\" format=\"ascii\">"
    );
    for root in &lines {
        let _ = write!(out, "{} ", root.type_index);
    }
    out.push_str("\n</DataArray>\n");
    let _ = writeln!(
        out,
        "<DataArray type=\"Float64\" Name=\"length\" format=\"ascii\">"
    );
    for root in &lines {
        let _ = write!(out, "{} ", root.length);
    }
    out.push_str("\n</DataArray>\n");
    let _ = writeln!(
        out,
        "<DataArray type=\"Float64\" Name=\"age\" format=\"ascii\">"
    );
    for root in &lines {
        let _ = write!(out, "{} ", root.age.max(0.0));
    }
    out.push_str("\n</DataArray>\n");
    let _ = writeln!(
        out,
        "<DataArray type=\"Float64\" Name=\"order\" format=\"ascii\">"
    );
    for order in &line_orders {
        let _ = write!(out, "{order} ");
    }
    out.push_str("\n</DataArray>\n");
    out.push_str("</CellData>\n");

    out.push_str("</Piece>\n</PolyData>\n</VTKFile>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimParams;
    use crate::scale::ElongationScale;

    fn grown_system() -> RootSystem {
        let mut system = RootSystem::new(&SimParams::default(), ElongationScale::new(1.0), 4);
        system.simulate(5.0);
        system
    }

    #[test]
    fn document_counts_match_the_system() {
        let system = grown_system();
        let doc = render_vtp(&system);
        assert!(doc.contains(&format!("NumberOfPoints=\"{}\"", system.node_count())));
        let segmented = system.roots.iter().filter(|r| r.nodes.len() >= 2).count();
        assert!(doc.contains(&format!("NumberOfLines=\"{segmented}\"")));
        for name in ["type", "length", "age", "order"] {
            assert!(doc.contains(&format!("Name=\"{name}\"")));
        }
        assert!(doc.contains("</VTKFile>"));
    }

    #[test]
    fn write_creates_missing_directories() {
        let system = grown_system();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("out.vtp");
        write_vtp(&system, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<?xml"));
    }
}
