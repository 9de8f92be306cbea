//! Transforms applied to the HTML shell.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use crate::compile::content_hash;
use crate::graph::FileStamp;

/// URL prefix of unbundled public assets in development.
pub const PUBLIC_URL_PREFIX: &str = "/public/";

/// URL prefix of hashed assets in production.
pub const ASSETS_URL_PREFIX: &str = "/assets/";

/// Id of the dev client configuration script.
pub const DEV_CLIENT_ID: &str = "__VOYAGE_DEV__";

/// Rewrite every `href`/`src` attribute pointing at a public asset.
///
/// `rewrite` receives the path below `/public/` and returns the new URL,
/// or `None` to leave the link alone.
pub fn rewrite_public_links<F>(html: &str, rewrite: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(idx) = find_link_attr(rest) {
        let (before, after) = rest.split_at(idx);
        out.push_str(before);

        let quote_at = after.find(['"', '\'']).unwrap_or(0);
        let quote = after[quote_at..].chars().next().unwrap_or('"');
        let value_start = quote_at + 1;
        let Some(value_len) = after[value_start..].find(quote) else {
            out.push_str(after);
            return out;
        };
        let value = &after[value_start..value_start + value_len];

        out.push_str(&after[..value_start]);
        match value
            .strip_prefix(PUBLIC_URL_PREFIX)
            .and_then(|asset| rewrite(asset))
        {
            Some(new_value) => out.push_str(&new_value),
            None => out.push_str(value),
        }
        rest = &after[value_start + value_len..];
    }

    out.push_str(rest);
    out
}

/// Byte offset of the next `href=` or `src=` attribute with a quoted value.
fn find_link_attr(html: &str) -> Option<usize> {
    ["href=\"", "href='", "src=\"", "src='"]
        .iter()
        .filter_map(|needle| {
            html.match_indices(needle)
                .find(|(i, _)| *i == 0 || html.as_bytes()[i - 1].is_ascii_whitespace())
                .map(|(i, _)| i)
        })
        .min()
}

/// Development shell: cache-busted asset links and the dev client config.
pub fn transform_shell_dev(html: &str, public_dir: &Path) -> String {
    let html = rewrite_public_links(html, |asset| {
        let stamp = FileStamp::of(&public_dir.join(asset)).ok()?;
        Some(format!("{}{}?v={}", PUBLIC_URL_PREFIX, asset, stamp.token()))
    });

    let dev_client = format!(
        "<meta name=\"voyage-env\" content=\"development\">\n<script type=\"application/json\" id=\"{}\">{{\"modules\":\"/@modules/\"}}</script>\n",
        DEV_CLIENT_ID
    );
    inject_before_head_close(&html, &dev_client)
}

/// Production shell: asset links point at hashed output names.
pub fn transform_shell_prod(html: &str, assets: &BTreeMap<String, String>) -> String {
    rewrite_public_links(html, |asset| {
        assets
            .get(asset)
            .map(|hashed| format!("{}{}", ASSETS_URL_PREFIX, hashed))
    })
}

fn inject_before_head_close(html: &str, snippet: &str) -> String {
    match html.find("</head>") {
        Some(idx) => format!("{}{}{}", &html[..idx], snippet, &html[idx..]),
        None => format!("{}{}", snippet, html),
    }
}

/// Content-hashed file name: `css/site.css` -> `css/site.3f2a9c1b0d4e.css`.
pub fn hashed_asset_name(asset: &str, bytes: &[u8]) -> String {
    let hash = content_hash(bytes);
    let (dir, file) = match asset.rsplit_once('/') {
        Some((dir, file)) => (format!("{}/", dir), file),
        None => (String::new(), asset),
    };
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}{}.{}.{}", dir, stem, hash, ext),
        _ => format!("{}{}.{}", dir, file, hash),
    }
}

/// Copy every file under `public_dir` into `out_dir` under hashed names.
///
/// Returns the map from public path to hashed path. A missing public
/// directory yields an empty map.
pub fn emit_public_assets(
    public_dir: &Path,
    out_dir: &Path,
) -> io::Result<BTreeMap<String, String>> {
    let mut assets = BTreeMap::new();
    if !public_dir.is_dir() {
        return Ok(assets);
    }

    let mut pending = vec![public_dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }

            let Ok(relative) = path.strip_prefix(public_dir) else {
                continue;
            };
            let asset = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let bytes = fs::read(&path)?;
            let hashed = hashed_asset_name(&asset, &bytes);
            let target = out_dir.join(&hashed);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, &bytes)?;
            assets.insert(asset, hashed);
        }
    }

    Ok(assets)
}
