use stacks_core::{ControlIcon, ControlView};

/// Text placed between the reference control and the injected one.
pub const CONTROL_SEPARATOR: &str = " · ";
/// Attribute carrying the control id on the injected element.
pub const CONTROL_ATTR: &str = "data-stacks-control";

const CONTROL_CLASS: &str = "custom-a text-[#2563eb] inline-block outline-offset-[-2px] outline-2 rounded-[3px] focus:outline font-semibold text-sm leading-none hover:opacity-80 relative stacks-btn";

fn icon_class(icon: ControlIcon) -> &'static str {
    match icon {
        ControlIcon::Download => "icon-[typcn--download]",
        ControlIcon::Spinner => "icon-[svg-spinners--ring-resize]",
        ControlIcon::Check => "icon-[mdi--check]",
        ControlIcon::Alert => "icon-[mdi--alert-circle-outline]",
    }
}

/// Markup for one injected control, styled like the host's own links.
pub fn control_html(view: &ControlView) -> String {
    let disabled = if view.enabled {
        ""
    } else {
        r#" style="pointer-events: none" aria-disabled="true""#
    };
    format!(
        r##"<a href="#" class="{CONTROL_CLASS}" {CONTROL_ATTR}="{id}" title="Add to Stacks queue"{disabled}><span class="text-[15px] align-text-bottom inline-block {icon} mr-[1px]"></span>{label}</a>"##,
        id = view.control_id,
        icon = icon_class(view.icon),
        label = view.label,
    )
}
