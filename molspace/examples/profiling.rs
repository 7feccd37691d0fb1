use molspace::{NeighborList, SimulationBox, Vector3D};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let n_side = match std::env::args().nth(1) {
        Some(value) => value.parse::<usize>()?,
        None => 20,
    };

    // enable collection of profiling data
    time_graph::enable_data_collection(true);
    // clear any existing collected data
    time_graph::clear_collected_data();

    // run the neighbor search
    time_graph::spanned!("Full neighbor search", {
        run_neighbor_search(n_side)
    })?;

    // get the call graph and display it
    let graph = time_graph::get_full_graph();
    // (this requires the "table" feature for the time_graph crate)
    println!("{}", graph.as_short_table());

    // also available for saving profiling data to the disk & future analysis
    // (this requires the "json" feature for the time_graph crate)
    println!("{}", graph.as_json());

    Ok(())
}

/// Build a neighbor list for atoms on a distorted lattice in a triclinic box,
/// and update it a few times after moving the atoms
fn run_neighbor_search(n_side: usize) -> Result<(), molspace::Error> {
    let simulation_box = SimulationBox::from_lengths_angles(
        Vector3D::new(1.5 * n_side as f64, 1.5 * n_side as f64, 1.5 * n_side as f64),
        Vector3D::new(80.0, 100.0, 110.0),
    )?;

    let mut positions = Vec::new();
    for i in 0..n_side {
        for j in 0..n_side {
            for k in 0..n_side {
                let fractional = Vector3D::new(i as f64, j as f64, k as f64) / n_side as f64;
                positions.push(simulation_box.cartesian(fractional));
            }
        }
    }
    simulation_box.wrap_positions(&mut positions);

    let parameters = r#"{
        "cutoff": 4.5,
        "parallel": true
    }"#;
    let mut neighbors = NeighborList::from_json(&simulation_box, parameters)?;
    neighbors.build(&positions);

    for step in 0..10 {
        for (i, position) in positions.iter_mut().enumerate() {
            let phase = (i + step) as f64;
            *position += Vector3D::new(f64::sin(phase), f64::cos(phase), f64::sin(0.5 * phase)) * 0.05;
        }
        simulation_box.wrap_positions(&mut positions);
        neighbors.update(&positions);
    }

    let pairs = neighbors.pairs()?;
    println!("found {} pairs for {} atoms", pairs.len(), positions.len());

    Ok(())
}
