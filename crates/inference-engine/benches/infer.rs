//! Encode + infer throughput over a synthetic forest

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{encode, RawObservation, Schema, ENCODED_COLUMNS};
use inference_engine::{DecisionTree, ForestClassifier, InferenceEngine, ModelBundle, TreeNode};

/// Complete tree of the given depth cycling through the features
fn tree(depth: u32, n_classes: usize) -> DecisionTree {
    let internal = (1usize << depth) - 1;
    let total = (1usize << (depth + 1)) - 1;
    let nodes = (0..total)
        .map(|idx| {
            if idx < internal {
                TreeNode::Split {
                    feature: idx % ENCODED_COLUMNS.len(),
                    threshold: 100.0 + idx as f64,
                    left: 2 * idx + 1,
                    right: 2 * idx + 2,
                }
            } else {
                let mut value = vec![1.0; n_classes];
                value[idx % n_classes] += 5.0;
                TreeNode::Leaf { value }
            }
        })
        .collect();
    DecisionTree { nodes }
}

fn forest(classes: &[&str], n_trees: usize) -> ForestClassifier {
    ForestClassifier::new(
        classes.iter().map(|c| c.to_string()).collect(),
        (0..n_trees).map(|_| tree(8, classes.len())).collect(),
    )
}

fn bench_infer(c: &mut Criterion) {
    let schema = Schema::new(ENCODED_COLUMNS);
    let bundle = ModelBundle::new(
        Box::new(forest(&["0", "1"], 100)),
        Box::new(forest(&["Heat Dissipation Failure", "Power Failure", "Tool Wear Failure"], 100)),
        schema.clone(),
        0.0,
    )
    .expect("valid bundle");
    let engine = InferenceEngine::new(bundle);
    let observation = RawObservation::new("L", 300.0, 310.0, 1500, 50.0, 200);

    c.bench_function("encode", |b| b.iter(|| encode(black_box(&observation), &schema)));
    c.bench_function("infer_100_trees", |b| b.iter(|| engine.infer(black_box(&observation))));
}

criterion_group!(benches, bench_infer);
criterion_main!(benches);
