//! Class listing command handler

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Serialize)]
struct ClassRow {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instances: Option<u64>,
}

pub fn handle(input: &Path, filter: Option<&str>, counts: bool, json: bool) -> Result<()> {
    let heap = super::open_heap(input)?;

    let per_class: Option<HashMap<u64, u64>> = counts.then(|| {
        let mut map = HashMap::new();
        for rec in heap.instances() {
            if let Some(class_id) = heap.class_id_of(rec) {
                *map.entry(class_id).or_insert(0) += 1;
            }
        }
        map
    });

    let rows: Vec<ClassRow> = heap
        .classes()
        .filter(|class| filter.map_or(true, |f| class.name.contains(f)))
        .map(|class| ClassRow {
            name: class.name.clone(),
            instances: per_class
                .as_ref()
                .map(|m| m.get(&class.object_id).copied().unwrap_or(0)),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        match row.instances {
            Some(count) => println!("{:>10}  {}", count, row.name),
            None => println!("{}", row.name),
        }
    }
    eprintln!("{} classes", rows.len());

    Ok(())
}
