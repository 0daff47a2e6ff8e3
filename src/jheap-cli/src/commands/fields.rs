//! Instance field dump command handler

use crate::config::Config;
use anyhow::{bail, Context, Result};
use jheap::{display_value, field_values, Heap, ObjectKind};
use std::path::Path;

pub fn handle(input: &Path, object_id: Option<&str>, class: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let heap = super::open_heap(input)?;

    let object_id = match object_id {
        Some(raw) => parse_object_id(raw)?,
        None => {
            let target = class
                .map(str::to_string)
                .or(config.target_class)
                .unwrap_or_else(|| "char[]".to_string());
            first_instance_of(&heap, &target)
                .with_context(|| format!("No instances of {} in the dump", target))?
        }
    };

    let Some(rec) = heap.instance_by_id(object_id) else {
        bail!("No object with id {:#x} in the dump", object_id);
    };
    println!("{} @ {:#x}", heap.class_name_of(rec), object_id);

    if !matches!(rec.kind, ObjectKind::Instance { .. }) {
        println!("(no fields)");
        return Ok(());
    }

    let fields = field_values(&heap, object_id)?;
    if fields.is_empty() {
        println!("(no fields)");
    }
    for (name, value) in fields {
        println!("{} => {}", name, display_value(&heap, value));
    }

    Ok(())
}

/// First marked instance, in dump order
fn first_instance_of(heap: &Heap, target: &str) -> Option<u64> {
    heap.instances()
        .find(|rec| {
            heap.class_id_of(rec)
                .is_some_and(|class_id| heap.is_subtype_of(class_id, target))
        })
        .map(|rec| rec.object_id)
}

/// Parse a decimal or 0x-prefixed hex object id
fn parse_object_id(raw: &str) -> Result<u64> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.with_context(|| format!("Invalid object id: {}", raw))
}
