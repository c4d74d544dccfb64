//! File round-trip through the reader and writer.

use cpmp_core::Instance;
use cpmp_io::{read_instance, write_instance};
use tempfile::TempDir;

fn hand_built() -> Instance {
    Instance::new(
        2,
        vec![vec![0, 12, 30], vec![11, 0, 7], vec![29, 8, 0]],
        vec![5, 3, 4],
        vec![8, 9, 6],
    )
    .unwrap()
}

#[test]
fn three_location_instance_survives_write_and_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("three.cpmp");
    let original = hand_built();

    write_instance(&original, &path).unwrap();
    let reread = read_instance(&path).unwrap();

    assert_eq!(reread, original);
    assert_eq!(reread.distance(0, 1), 12);
    assert_eq!(reread.distance(1, 0), 11);
    assert_eq!(reread.demands(), &[5, 3, 4]);
    assert_eq!(reread.capacities(), &[8, 9, 6]);
}

#[test]
fn commented_file_reads_like_the_plain_one() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("commented.cpmp");
    std::fs::write(
        &path,
        "# three locations\n3 2\n\n# distances\n0 12 30\n11 0 7\n29 8 0\n# demands\n5 3 4\n# capacities\n8 9 6\n",
    )
    .unwrap();

    assert_eq!(read_instance(&path).unwrap(), hand_built());
}

#[test]
fn missing_file_mentions_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.cpmp");
    let err = read_instance(&path).unwrap_err();
    assert!(err.to_string().contains("absent.cpmp"));
}
