use fnbench_core::catalog;

use crate::exit_codes::SUCCESS;

pub fn run() -> anyhow::Result<i32> {
    println!("leaf categories:");
    for leaf in catalog::LEAF_CATEGORIES {
        println!("  {leaf}");
    }
    println!("aliases:");
    for (alias, leaves) in catalog::ALIASES {
        println!("  {alias} -> {}", leaves.join(", "));
    }
    Ok(SUCCESS)
}
