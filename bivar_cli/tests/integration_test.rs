use bivar_cli::Session;
use bivar_engine::Options;
use pretty_assertions::StrComparison;
use std::{fs, path::Path};

#[test]
fn test_sessions() {
    let testdata = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata");
    let mut paths_with_errors = Vec::new();
    let mut ok_paths = Vec::new();
    for entry in fs::read_dir(testdata.join("sessions")).expect("Failed to read test directory") {
        let entry = entry.expect("Failed to read directory entry");
        let path = entry.path();
        let path_string = path.to_string_lossy().to_string();

        if path.is_file() {
            let content = fs::read_to_string(&path).expect("Failed to read file");
            let parts: Vec<&str> = content.split("\\\\\\ Result \\\\\\").collect();

            if parts.len() != 2 {
                paths_with_errors.push(path_string);
                println!("Invalid test file format: {}", path.display());
                continue;
            }

            let commands = parts[0].trim();
            let expected_result = parts[1].trim();

            let mut session = Session::new(&testdata, Options::default());
            let mut actual_result = String::new();
            for line in commands.lines().map(str::trim) {
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                match session.execute(line) {
                    Ok(output) => {
                        actual_result.push_str(&output);
                        if !output.is_empty() && !output.ends_with('\n') {
                            actual_result.push('\n');
                        }
                    }
                    Err(e) => actual_result.push_str(&format!("error: {}\n", e)),
                }
            }

            if actual_result.trim() != expected_result {
                paths_with_errors.push(path_string);
                println!("Mismatch in file {}:", path.display());
                println!(
                    "{}",
                    StrComparison::new(actual_result.trim(), expected_result)
                );
            } else {
                ok_paths.push(path_string);
            }
        }
    }
    println!("Paths without errors:");
    for path in &ok_paths {
        println!("✅ {}", path);
    }
    println!("Paths with errors:");
    for path in &paths_with_errors {
        println!("❌ {}", path);
    }
    assert_eq!(paths_with_errors.len(), 0, "Some test files had errors");
}

#[test]
fn test_seeded_sampling_is_reproducible() {
    let testdata = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata");
    let draw = || {
        let options = Options {
            seed: Some(42),
            ..Options::default()
        };
        let mut session = Session::new(&testdata, options);
        session.execute("load tables/dyadic.csv").unwrap();
        session.execute("sample 20").unwrap()
    };
    let first = draw();
    assert_eq!(first.lines().count(), 20);
    assert_eq!(first, draw());
}
