//! Client-side destination search.

use super::resolve::Destination;

/// Destinations whose name contains `query`, ignoring case.
///
/// Case folding is Unicode lowercase, so "KÖLLN" finds "Neukölln". A blank
/// query keeps everything. Order is preserved.
pub fn filter_destinations<'a>(list: &'a [Destination], query: &str) -> Vec<&'a Destination> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return list.iter().collect();
    }
    list.iter()
        .filter(|d| d.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LocationId, RouteId};

    fn dest(route: &str, name: &str) -> Destination {
        Destination {
            route_id: RouteId::new(route).unwrap(),
            destination_id: Some(LocationId::new(format!("to-{route}")).unwrap()),
            name: name.to_string(),
        }
    }

    fn names<'a>(found: &[&'a Destination]) -> Vec<&'a str> {
        found.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn kreuz_finds_kreuzberg() {
        let list = vec![dest("r1", "Prenzlauer Berg"), dest("r2", "Kreuzberg")];
        assert_eq!(names(&filter_destinations(&list, "kreuz")), ["Kreuzberg"]);
    }

    #[test]
    fn blank_query_keeps_all() {
        let list = vec![dest("r1", "Prenzlauer Berg"), dest("r2", "Kreuzberg")];
        assert_eq!(filter_destinations(&list, "").len(), 2);
        assert_eq!(filter_destinations(&list, "   ").len(), 2);
    }

    #[test]
    fn unicode_case_folding() {
        let list = vec![dest("r7", "Neukölln"), dest("r8", "Charlottenburg")];
        assert_eq!(names(&filter_destinations(&list, "KÖLLN")), ["Neukölln"]);
    }

    #[test]
    fn no_match_is_empty() {
        let list = vec![dest("r1", "Prenzlauer Berg")];
        assert!(filter_destinations(&list, "spandau").is_empty());
    }
}
