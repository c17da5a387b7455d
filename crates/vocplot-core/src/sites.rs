use std::collections::HashSet;

use polars::prelude::*;
use vocplot_parser::schema::SITE_NAME;

use crate::error::Result;
use crate::frame::{filter_rows, str_values};

/// Distinct site names in first-seen order.
pub fn distinct_sites(df: &DataFrame) -> Result<Vec<String>> {
    let names = str_values(df, SITE_NAME, "site partitioning")?;
    let mut sites: Vec<String> = Vec::new();
    for name in names.into_iter().flatten() {
        if !sites.contains(&name) {
            sites.push(name);
        }
    }
    Ok(sites)
}

pub fn site_partition(df: &DataFrame, site: &str) -> Result<DataFrame> {
    let names = str_values(df, SITE_NAME, "site partitioning")?;
    let keep: Vec<bool> = names
        .iter()
        .map(|name| name.as_deref() == Some(site))
        .collect();
    filter_rows(df, &keep)
}

/// Filesystem-safe form of a site name used in output paths.
pub fn site_slug(site: &str) -> String {
    let slug: String = site
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if slug.is_empty() {
        "unnamed_site".to_string()
    } else {
        slug
    }
}

/// Output directory per site, aligned with `sites`. Sites whose slugs collide get a numeric
/// suffix in first-seen order, so no two sites share a directory.
pub fn site_directories(sites: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    sites
        .iter()
        .map(|site| {
            let base = site_slug(site);
            let mut candidate = base.clone();
            let mut suffix = 2;
            while !taken.insert(candidate.clone()) {
                candidate = format!("{base}_{suffix}");
                suffix += 1;
            }
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_replaces_separators() {
        assert_eq!(site_slug("Harbor East"), "Harbor_East");
        assert_eq!(site_slug("Milby Park/C169"), "Milby_Park_C169");
        assert_eq!(site_slug("  "), "unnamed_site");
    }

    #[test]
    fn colliding_slugs_get_suffixes() {
        let sites: Vec<String> = ["Harbor East", "Harbor_East", "Harbor/East", "Refinery Gate"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            site_directories(&sites),
            vec!["Harbor_East", "Harbor_East_2", "Harbor_East_3", "Refinery_Gate"]
        );
    }

    #[test]
    fn suffix_skips_names_already_taken() {
        let sites: Vec<String> = ["A_2", "A", " A "].iter().map(|s| s.to_string()).collect();
        assert_eq!(site_directories(&sites), vec!["A_2", "A", "A_3"]);
    }
}
