use shelf::registry::PackageRegistry;
use shelf::tree::TreeNode;
use shelf::ShelfResult;

pub fn run(registry: &PackageRegistry) -> ShelfResult<()> {
    let snapshot = registry.snapshot();

    if snapshot.packages().is_empty() {
        println!("No packages found.");
    }

    let mut names: Vec<&String> = snapshot.packages().keys().collect();
    names.sort();

    for name in names {
        let registered = &snapshot.packages()[name.as_str()];
        println!(
            "{:20} {:>4} {:8} {}",
            name,
            registered.package.priority(),
            registered.kind.to_string(),
            registered.package.root().display()
        );
    }

    if let Some(checksum) = snapshot.checksum() {
        println!("checksum = {}", checksum);
    }

    Ok(())
}
