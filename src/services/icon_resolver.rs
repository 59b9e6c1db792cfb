// Icon Resolver
// Turns a bookmark's icon shorthand into an image URL.
//
//   dh-<name>[.svg|.png|.webp]  dashboard-icons on jsDelivr (png unless one of those is given)
//   mdi-<name>                  Material Design Icons svg
//   si-<name>                   Simple Icons svg (name lowercased)
//   sh-<name>[.svg|.png|.webp]  selfh.st icons (png unless one of those is given)
//
// http(s) and protocol-relative URLs pass through unchanged.

const DASHBOARD_ICONS_CDN: &str = "https://cdn.jsdelivr.net/gh/homarr-labs/dashboard-icons";
const MDI_CDN: &str = "https://unpkg.com/@mdi/svg/svg";
const SIMPLE_ICONS_CDN: &str = "https://unpkg.com/simple-icons@latest/icons";
const SELFHST_CDN: &str = "https://selfh.st/icons";

/// Image extensions the icon CDNs serve.
const IMAGE_EXTENSIONS: [&str; 3] = ["svg", "png", "webp"];

/// Resolves an icon reference to a URL. Blank or unrecognised input yields `None`.
pub fn resolve_icon(icon: &str) -> Option<String> {
    let icon = icon.trim();
    if icon.is_empty() {
        return None;
    }
    if is_web_url(icon) {
        return Some(icon.to_string());
    }

    if let Some(name) = non_empty(icon.strip_prefix("dh-")) {
        return Some(match split_image_extension(name) {
            Some((base, ext)) => format!("{}/{}/{}.{}", DASHBOARD_ICONS_CDN, ext, base, ext),
            None => format!("{}/png/{}.png", DASHBOARD_ICONS_CDN, name),
        });
    }
    if let Some(name) = non_empty(icon.strip_prefix("mdi-")) {
        return Some(format!("{}/{}.svg", MDI_CDN, name));
    }
    if let Some(name) = non_empty(icon.strip_prefix("si-")) {
        return Some(format!("{}/{}.svg", SIMPLE_ICONS_CDN, name.to_lowercase()));
    }
    if let Some(name) = non_empty(icon.strip_prefix("sh-")) {
        return Some(match split_image_extension(name) {
            Some(_) => format!("{}/{}", SELFHST_CDN, name),
            None => format!("{}/{}.png", SELFHST_CDN, name),
        });
    }
    None
}

/// `http://`, `https://` or `//`, in any case.
fn is_web_url(icon: &str) -> bool {
    let lower = icon.to_ascii_lowercase();
    ["http://", "https://", "//"].iter().any(|p| lower.starts_with(p))
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// `"plex.SVG"` -> `Some(("plex", "svg"))`. Suffixes other than svg, png or webp
/// are part of the name: `"adguard.home"` -> `None`.
fn split_image_extension(name: &str) -> Option<(&str, String)> {
    let (base, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    if base.is_empty() || !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    Some((base, ext))
}
