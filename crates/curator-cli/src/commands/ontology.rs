//! Ontology command implementation.
//!
//! Loads an ontology snapshot from JSON and prints derived views of it.

use std::path::Path;

use anyhow::Result;
use curator_core::Ontology;
use curator_ops::{ConceptNode, Config, OntologyProjection};

use super::read_json;

fn load(config: &Config, file: &Path) -> Result<OntologyProjection> {
    let ontology: Ontology = read_json(file)?;
    Ok(OntologyProjection::new(ontology, config))
}

/// Print the concept hierarchy.
pub fn tree(config: &Config, file: &Path) -> Result<()> {
    let mut projection = load(config, file)?;
    let root = projection.concept_tree();
    print!("{}", render_tree(&root));
    println!("\n{} concepts", root.size());
    Ok(())
}

/// Print the concepts that descend from the entity root.
pub fn entities(config: &Config, file: &Path) -> Result<()> {
    let mut projection = load(config, file)?;
    let concepts = projection.entity_concepts();
    if concepts.is_empty() {
        println!("(no entity concepts)");
        return Ok(());
    }
    for concept in concepts.iter() {
        println!("{:<40} {}", concept.display_name, concept.id);
    }
    Ok(())
}

/// Print the properties of a concept.
pub fn properties(config: &Config, file: &Path, concept: &str, inherited: bool) -> Result<()> {
    let mut projection = load(config, file)?;
    let properties = projection.properties_by_concept(concept, inherited)?;
    if properties.is_empty() {
        println!("(no properties)");
        return Ok(());
    }
    for property in properties.iter() {
        println!(
            "{:<32} {:<12} {}",
            property.display_name, property.data_type, property.title
        );
    }
    Ok(())
}

/// Print the relationships allowed from `source` to `dest`.
pub fn between(config: &Config, file: &Path, source: &str, dest: &str) -> Result<()> {
    let mut projection = load(config, file)?;
    let relationships = projection.relationships_between(source, dest);
    if relationships.is_empty() {
        println!("(no relationships from {} to {})", source, dest);
        return Ok(());
    }
    for relationship in relationships {
        println!("{:<32} {}", relationship.display_name, relationship.title);
    }
    Ok(())
}

fn render_tree(root: &ConceptNode) -> String {
    fn walk(node: &ConceptNode, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&node.concept.display_name);
        if !node.concept.user_visible {
            out.push_str(" (hidden)");
        }
        out.push('\n');
        for child in &node.children {
            walk(child, depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(root, 0, &mut out);
    out
}
