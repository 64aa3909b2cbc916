use crate::error::CatalogError;
use crate::storage::IconManager;

fn foreign_icon() -> CatalogError {
    CatalogError::validation("无效的图标路径", "图标必须上传到腾讯云COS")
}

/// Icon for a new entry: must come from our store; fresh uploads take the software's name.
pub(super) async fn icon_for_create(
    icons: &IconManager,
    software_name: &str,
    icon: &str,
) -> Result<String, CatalogError> {
    if icon.is_empty() {
        return Ok(String::new());
    }
    if !icons.accepts(icon) {
        return Err(foreign_icon());
    }
    if icons.is_temporary(icon) {
        return Ok(icons.rename_for_software(software_name, icon).await);
    }
    Ok(icon.to_string())
}

/// Outcome of an icon change on update.
#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct IconChange {
    /// Value to store; `None` leaves the column as is.
    pub(super) next: Option<String>,
    /// Previous icon to delete once the row is saved.
    pub(super) stale: Option<String>,
}

/// `requested` is the body's `icon` (`None` when absent, `Some("")` when cleared).
pub(super) async fn reconcile_on_update(
    icons: &IconManager,
    software_name: &str,
    current: &str,
    requested: Option<String>,
) -> Result<IconChange, CatalogError> {
    let Some(requested) = requested else {
        return Ok(IconChange::default());
    };
    let stale_unless = |next: &str| (!current.is_empty() && current != next).then(|| current.to_string());

    if requested.is_empty() {
        return Ok(IconChange {
            stale: stale_unless(""),
            next: Some(requested),
        });
    }
    if !icons.accepts(&requested) {
        return Err(foreign_icon());
    }
    let next = if icons.is_temporary(&requested) {
        icons.rename_for_software(software_name, &requested).await
    } else {
        requested
    };
    Ok(IconChange {
        stale: stale_unless(&next),
        next: Some(next),
    })
}
