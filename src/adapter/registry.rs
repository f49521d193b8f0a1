//! Link-time registry of built-in adapters

use super::traits::Adapter;

/// Registration entry for an adapter
pub struct AdapterInfo {
    pub name: &'static str,
    pub summary: &'static str,
    pub factory: fn() -> Box<dyn Adapter>,
}

inventory::collect!(AdapterInfo);

/// Register an adapter type under a name
///
/// The type must implement `Default` and `Adapter`.
#[macro_export]
macro_rules! adapter {
    ($adapter_type:ty, $name:expr, $summary:expr) => {
        inventory::submit! {
            $crate::adapter::registry::AdapterInfo {
                name: $name,
                summary: $summary,
                factory: || Box::new(<$adapter_type>::default()) as Box<dyn $crate::adapter::Adapter>,
            }
        }
    };
}

/// All registered adapters, sorted by name
pub fn discover_adapters() -> Vec<&'static AdapterInfo> {
    let mut adapters: Vec<&'static AdapterInfo> = inventory::iter::<AdapterInfo>().collect();
    adapters.sort_by_key(|info| info.name);
    adapters
}

pub fn adapter_names() -> Vec<&'static str> {
    discover_adapters().into_iter().map(|info| info.name).collect()
}

/// Instantiate a registered adapter by name
pub fn create_adapter(name: &str) -> Option<Box<dyn Adapter>> {
    inventory::iter::<AdapterInfo>()
        .find(|info| info.name == name)
        .map(|info| (info.factory)())
}
