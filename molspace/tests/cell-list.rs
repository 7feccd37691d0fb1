use molspace::{CellList, SimulationBox, Vector3D};

mod data;

#[test]
fn every_atom_in_one_cell() {
    let boxes = [
        SimulationBox::cubic(20.0).unwrap(),
        SimulationBox::from_lengths_angles(Vector3D::new(12.0, 13.0, 14.0), Vector3D::new(75.0, 95.0, 110.0)).unwrap(),
        SimulationBox::from_lengths_tilts(Vector3D::new(14.0, 12.0, 13.0), Vector3D::new(4.0, -3.0, 2.5)).unwrap(),
    ];

    for simulation_box in &boxes {
        let positions = data::positions_in_box(simulation_box, 500, 21);
        for cell_width in [0.0, 1.0, 2.5, 7.0] {
            let mut cell_list = CellList::new(simulation_box, cell_width).unwrap();
            cell_list.add_atoms(&positions);
            assert_eq!(cell_list.n_atoms(), positions.len());

            let mut seen = vec![0; positions.len()];
            for (index, atoms) in cell_list.iter() {
                for &atom in atoms {
                    seen[atom] += 1;
                    assert_eq!(cell_list.cell_index(positions[atom]), index);
                }
            }
            assert!(seen.iter().all(|&count| count == 1));

            // adding the atoms again after a reset gives the same cells
            let before = cell_list.iter().map(|(_, atoms)| atoms.to_vec()).collect::<Vec<_>>();
            cell_list.reset();
            assert_eq!(cell_list.n_atoms(), 0);
            cell_list.add_atoms(&positions);
            let after = cell_list.iter().map(|(_, atoms)| atoms.to_vec()).collect::<Vec<_>>();
            assert_eq!(before, after);
        }
    }
}

#[test]
fn periodic_images_share_cells() {
    let simulation_box = SimulationBox::from_lengths_angles(
        Vector3D::new(10.0, 11.0, 12.0),
        Vector3D::new(90.0, 80.0, 120.0),
    ).unwrap();
    let cell_list = CellList::new(&simulation_box, 2.0).unwrap();

    let positions = data::positions_in_box(&simulation_box, 100, 22);
    for position in positions {
        let image = position + simulation_box.cartesian(Vector3D::new(2.0, -1.0, 3.0));
        // avoid positions right at the boundary between two cells
        let shape = cell_list.shape();
        let fractional = simulation_box.fractional(position);
        let scaled = (0..3).map(|i| (fractional[i] + 1.0).fract() * shape[i] as f64);
        if scaled.into_iter().any(|s| (s - s.round()).abs() < 1e-6) {
            continue;
        }

        assert_eq!(cell_list.cell_index(position), cell_list.cell_index(image));
        assert_eq!(cell_list.cell_index(position), cell_list.cell_index(simulation_box.wrap(image)));
    }
}

#[test]
fn vicinity_contains_close_atoms() {
    let simulation_box = SimulationBox::from_lengths_tilts(
        Vector3D::new(14.0, 12.0, 13.0),
        Vector3D::new(4.0, -3.0, 2.5),
    ).unwrap();
    let positions = data::positions_in_box(&simulation_box, 400, 23);

    let cutoff = 2.0;
    let mut cell_list = CellList::new(&simulation_box, 2.0 * cutoff).unwrap();
    cell_list.add_atoms(&positions);

    for (i, &position) in positions.iter().enumerate() {
        let [x, y, z] = cell_list.cell_index(position);
        let vicinity = cell_list.vicinity(x, y, z);

        // no atom is reported twice
        let mut sorted = vicinity.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), vicinity.len());

        for (j, &other) in positions.iter().enumerate() {
            if simulation_box.distance(position, other) < cutoff {
                assert!(vicinity.contains(&j), "atom {} should be in the vicinity of atom {}", j, i);
            }
        }
    }
}

#[test]
fn infinite_box() {
    let simulation_box = SimulationBox::free();
    let mut cell_list = CellList::new(&simulation_box, 3.0).unwrap();

    let mut random = data::Random::new(24);
    let positions = (0..200).map(|_| random.vector(-10.0, 20.0)).collect::<Vec<_>>();
    cell_list.fit(&positions);
    assert_eq!(cell_list.shape(), [10, 10, 10]);

    cell_list.add_atoms(&positions);
    assert_eq!(cell_list.n_atoms(), 200);

    let total = cell_list.iter().map(|(_, atoms)| atoms.len()).sum::<usize>();
    assert_eq!(total, 200);

    for (i, &position) in positions.iter().enumerate() {
        let [x, y, z] = cell_list.cell_index(position);
        let vicinity = cell_list.vicinity(x, y, z);
        for (j, &other) in positions.iter().enumerate() {
            if (other - position).norm() < 3.0 {
                assert!(vicinity.contains(&j), "atom {} should be in the vicinity of atom {}", j, i);
            }
        }
    }
}
