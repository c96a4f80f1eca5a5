//! Copy a whole configuration section into another one.
use log::{error, warn};

use crate::store::{ConfigStore, ParamType, ParamValue, StoreError};

/// Parameter that receives the override display name.
pub const NAME_KEY: &str = "name";

/// Copy every parameter of `source` into `dest`, keeping each one's type.
///
/// `override_name` is written to `dest` as `name` before the copy, so a
/// `name` in the source still wins. A parameter that cannot be read or
/// written is skipped with a warning. Returns the number copied. Nothing
/// is rolled back when an error cuts the copy short.
pub fn copy_section<S: ConfigStore + ?Sized>(
    store: &mut S,
    source: &str,
    dest: &str,
    override_name: Option<&str>,
) -> Result<usize, StoreError> {
    let src = store.open_section(source)?;
    let dst = store.open_section(dest)?;

    if let Some(name) = override_name {
        store.set_parameter(&dst, NAME_KEY, &ParamValue::Str(name.to_string()))?;
    }

    let mut params: Vec<(String, ParamType)> = Vec::new();
    store.list_parameters(&src, &mut |key, ty| params.push((key.to_string(), ty)))?;

    let mut copied = 0;
    for (key, ty) in &params {
        let value = match store.get_parameter(&src, key, *ty) {
            Ok(value) => value,
            Err(e) => {
                warn!("Skipping '{key}' while copying '{source}' to '{dest}': {e}");
                continue;
            }
        };
        match store.set_parameter(&dst, key, &value) {
            Ok(()) => copied += 1,
            Err(e) => warn!("Couldn't copy '{key}' to '{dest}': {e}"),
        }
    }
    Ok(copied)
}

/// Boolean wrapper around [`copy_section`] that logs the failure.
pub fn auto_copy_input_config<S: ConfigStore + ?Sized>(
    store: &mut S,
    source: &str,
    dest: &str,
    override_name: Option<&str>,
) -> bool {
    match copy_section(store, source, dest, override_name) {
        Ok(_) => true,
        Err(e) => {
            error!("Couldn't copy config section '{source}' to '{dest}': {e}");
            false
        }
    }
}
