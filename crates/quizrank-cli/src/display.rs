//! Text rendering for trained models.
//!
//! `render_card` shows artifact metadata as a vertical key/value card;
//! `render_tree` lists the decision rules one node per line, indented by
//! depth, in the style of scikit-learn's `export_text`.

use std::fmt::Write;
use std::path::Path;

use quizrank_ai::{DecisionTree, ModelArtifact, Node};
use quizrank_core::Difficulty;

const LABEL_WIDTH: usize = 18;

pub fn render_card(artifact: &ModelArtifact, source: &Path) -> String {
    let tree = &artifact.tree;
    let labels: Vec<&str> = artifact.labels.iter().map(|d| d.as_str()).collect();
    let depth_limit = artifact
        .params
        .max_depth
        .map_or_else(|| "none".to_string(), |d| d.to_string());

    let rows: [(&str, String); 11] = [
        ("source", source.display().to_string()),
        ("format_version", artifact.format_version.to_string()),
        ("created_at", artifact.created_at.to_rfc3339()),
        ("features", artifact.feature_names.join(", ")),
        ("labels", labels.join(", ")),
        ("training_samples", artifact.training_samples.to_string()),
        ("max_depth", depth_limit),
        ("min_samples_leaf", artifact.params.min_samples_leaf.to_string()),
        ("nodes", tree.node_count().to_string()),
        ("leaves", tree.leaf_count().to_string()),
        ("depth", tree.depth().to_string()),
    ];

    let mut out = String::from("── Model ──\n");
    for (key, value) in rows {
        let _ = writeln!(out, "  {key:<LABEL_WIDTH$}{value}");
    }
    out
}

pub fn render_tree(tree: &DecisionTree, feature_names: &[String]) -> String {
    let mut out = String::new();
    write_node(&mut out, tree, feature_names, 0, 0);
    out
}

fn write_node(out: &mut String, tree: &DecisionTree, names: &[String], id: usize, depth: usize) {
    let indent = "|   ".repeat(depth);
    match &tree.nodes()[id] {
        Node::Split {
            feature,
            threshold,
            left,
            right,
            ..
        } => {
            let name = names
                .get(*feature)
                .cloned()
                .unwrap_or_else(|| format!("feature_{feature}"));
            let _ = writeln!(out, "{indent}|--- {name} <= {threshold:.2}");
            write_node(out, tree, names, *left, depth + 1);
            let _ = writeln!(out, "{indent}|--- {name} >  {threshold:.2}");
            write_node(out, tree, names, *right, depth + 1);
        }
        Node::Leaf { class, counts } => {
            let label = Difficulty::from_class(*class)
                .map_or_else(|| format!("class {class}"), |d| d.to_string());
            let _ = writeln!(out, "{indent}|--- class: {label} {counts:?}");
        }
    }
}
