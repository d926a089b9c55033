//! User-facing message templates.
//!
//! Templates use `{key}` placeholders filled in with [`crate::msg!`]:
//!
//! ```rust
//! use notes_components::{msg, MESSAGES};
//!
//! let text = msg!(MESSAGES.cli.install_success, name = "Markdown");
//! assert!(text.contains("Markdown"));
//! ```

/// Fill `{key}` placeholders in a template.
#[macro_export]
macro_rules! msg {
    ($template:expr) => {
        $template.to_string()
    };
    ($template:expr, $($key:ident = $value:expr),+ $(,)?) => {
        {
            let mut result = $template.to_string();
            $(
                result = result.replace(&format!("{{{}}}", stringify!($key)), &$value.to_string());
            )+
            result
        }
    };
}

pub struct LoadingMessages {
    pub failed_download: &'static str,
    pub checksum_mismatch: &'static str,
    pub local_server_failure: &'static str,
    pub doesnt_exist: &'static str,
    pub unknown: &'static str,
}

pub struct AlertMessages {
    pub server_failure_title: &'static str,
    pub server_failure_text: &'static str,
    pub permissions_title: &'static str,
    pub permissions_text: &'static str,
    pub permissions_allow: &'static str,
    pub permissions_deny: &'static str,
}

pub struct CliMessages {
    pub install_success: &'static str,
    pub install_failed: &'static str,
    pub install_up_to_date: &'static str,
    pub needs_download: &'static str,
    pub up_to_date: &'static str,
    pub uninstall_success: &'static str,
    pub unknown_component: &'static str,
    pub serving: &'static str,
    pub serving_component: &'static str,
    pub press_ctrl_c_to_stop: &'static str,
}

pub struct Messages {
    pub loading: LoadingMessages,
    pub alerts: AlertMessages,
    pub cli: CliMessages,
}

pub const MESSAGES: Messages = Messages {
    loading: LoadingMessages {
        failed_download: "The component could not be downloaded. Check your connection and try again.",
        checksum_mismatch: "The downloaded component did not pass its integrity check and was not installed.",
        local_server_failure: "Unable to start the component server. Editors and themes that need to be downloaded will not be available.",
        doesnt_exist: "The component was downloaded but could not be found on disk.",
        unknown: "An unknown error occurred while installing the component.",
    },
    alerts: AlertMessages {
        server_failure_title: "Component Server Unavailable",
        server_failure_text: "{message}\n\nError: {error}",
        permissions_title: "Activate {name}?",
        permissions_text: "{name} would like to interact with your {permissions}.",
        permissions_allow: "Continue",
        permissions_deny: "Cancel",
    },
    cli: CliMessages {
        install_success: "✅ Installed {name}",
        install_failed: "❌ Failed to install {name}: {reason}",
        install_up_to_date: "✓ {name} is already up to date",
        needs_download: "⬇️  {name} needs to be downloaded ({installed} → {latest})",
        up_to_date: "✓ {name} is up to date ({installed})",
        uninstall_success: "🗑️  Removed {name}",
        unknown_component: "❌ Unknown component '{identifier}'. Pass --url to install a third-party component.",
        serving: "🌐 Serving components from {root} at {url}",
        serving_component: "   {name}: {url}",
        press_ctrl_c_to_stop: "Press Ctrl+C to stop",
    },
};
