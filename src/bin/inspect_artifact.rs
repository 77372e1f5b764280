// Print a model artifact's estimator and category tables.
//
// Usage: cargo run --bin inspect_artifact -- models/yield_model.json [more.json ...]

use agrosense::ModelArtifact;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        anyhow::bail!("usage: inspect_artifact <artifact.json> [...]");
    }

    for path in &paths {
        let artifact = ModelArtifact::load(Path::new(path))?;

        println!("\n=== {} ({}) ===", artifact.name, path);
        println!(
            "Estimator: {} ({:?})",
            artifact.predictor.technique(),
            artifact.predictor.kind()
        );
        println!("Features:  {:?}", artifact.features);
        println!("Outputs:   {:?} ({} values)", artifact.outputs, artifact.predictor.n_outputs());

        let mut inputs: Vec<_> = artifact.input_categories.columns().collect();
        inputs.sort_by_key(|(name, _)| *name);
        for (column, table) in inputs {
            println!("  input  {:<12} {:>3} labels: {}", column, table.len(), table.labels().join(", "));
        }
        for (column, table) in artifact.output_categories.columns() {
            println!("  output {:<12} {:>3} labels: {}", column, table.len(), table.labels().join(", "));
        }
    }

    Ok(())
}
