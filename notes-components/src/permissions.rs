//! Permission prompts for components asking to read or write notes.

use tracing::{info, warn};

use crate::alerts::{AlertService, ConfirmRequest};
use crate::component::{Component, ComponentPermission, PermissionName};
use crate::messages::MESSAGES;
use crate::msg;

/// A pending permission request.
#[derive(Debug, Clone)]
pub struct PermissionDialog {
    pub component: Component,
    pub permissions: Vec<ComponentPermission>,
}

fn describe(permission: &ComponentPermission) -> Vec<String> {
    match permission.name {
        PermissionName::StreamContextItem => vec!["working note".to_string()],
        PermissionName::StreamItems if permission.content_types.is_empty() => {
            vec!["items".to_string()]
        }
        PermissionName::StreamItems => permission
            .content_types
            .iter()
            .map(|content_type| {
                let lower = content_type.to_lowercase();
                if lower.ends_with('s') {
                    lower
                } else {
                    format!("{lower}s")
                }
            })
            .collect(),
    }
}

fn join_human(parts: &[String]) -> String {
    match parts {
        [] => "data".to_string(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Human-readable list of what the component wants access to.
pub fn permissions_summary(permissions: &[ComponentPermission]) -> String {
    let mut parts: Vec<String> = Vec::new();
    for part in permissions.iter().flat_map(describe) {
        if !parts.contains(&part) {
            parts.push(part);
        }
    }
    join_human(&parts)
}

pub fn permissions_prompt(dialog: &PermissionDialog) -> ConfirmRequest {
    let name = dialog.component.name.as_str();
    ConfirmRequest {
        title: msg!(MESSAGES.alerts.permissions_title, name = name),
        text: msg!(
            MESSAGES.alerts.permissions_text,
            name = name,
            permissions = permissions_summary(&dialog.permissions)
        ),
        confirm_label: MESSAGES.alerts.permissions_allow.to_string(),
        cancel_label: MESSAGES.alerts.permissions_deny.to_string(),
    }
}

/// Ask the user and report the decision through `callback`.
///
/// `callback` runs exactly once: with `true` on confirmation and `false` on
/// cancel, dismissal or a failed prompt.
pub async fn present_permissions_dialog<F>(
    alerts: &dyn AlertService,
    dialog: &PermissionDialog,
    callback: F,
) where
    F: FnOnce(bool) + Send,
{
    let request = permissions_prompt(dialog);
    let approved = match alerts.confirm(&request).await {
        Ok(approved) => approved,
        Err(e) => {
            warn!(component = %dialog.component.identifier, error = %e, "Permission prompt failed");
            false
        }
    };

    info!(
        component = %dialog.component.identifier,
        approved,
        "Permission decision"
    );
    callback(approved);
}
