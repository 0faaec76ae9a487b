//! Example: Building a lineage diagram from rows
//!
//! This example ingests a few domain/system/table rows, collapses one
//! domain, lays out the visible projection and writes the result as SVG.

use lineage::{Diagram, Row};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Building diagram from rows...\n");

    let rows = vec![
        Row::new("Finance", "Ledger", "Invoices"),
        Row::new("Finance", "Ledger", "Payments"),
        Row::new("Sales", "Crm", "Customers"),
        Row::new("Sales", "Crm", "Invoices"),
    ];

    let mut diagram = Diagram::default();
    let summary = diagram.ingest(&rows)?;
    println!("Ingested {} rows:", rows.len());
    println!("  Nodes: {}", diagram.graph().node_count());
    println!("  Edges: {}", diagram.graph().edge_count());
    println!("  Key conflicts: {}", summary.conflicts);
    println!();

    // Sales keeps its members in the model; they are only hidden from view
    diagram.collapse_domain("Sales")?;
    println!("Visible nodes after collapsing Sales: {}", diagram.view().visible_nodes().len());

    let quality = diagram.relayout().await?;
    println!(
        "Layout finished: {} crossings, {} overlaps",
        quality.crossings, quality.overlaps
    );

    let svg = diagram.render_svg().to_string();
    println!("SVG length: {} bytes", svg.len());

    let output_path = "from_rows_output.svg";
    std::fs::write(output_path, &svg)?;
    println!("SVG written to: {}", output_path);

    Ok(())
}
