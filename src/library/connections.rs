// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::Ref;

use super::Link;

/// True when `filter` names exactly one commentator that appears as a commentary here.
pub fn is_single_commentary(filter: &[String], links: &[Link]) -> bool {
    let [name] = filter else {
        return false;
    };
    links.iter().any(|link| link.category == "Commentary" && link.commentator == *name)
}

/// Links a connections panel anchored at `anchor_refs` should list, in display order.
///
/// Section-wide links are only listed for a single commentary; otherwise a link must
/// be anchored at one of the displayed refs. A non-empty filter matches on category
/// or commentator.
pub fn visible_links<'a>(
    links: &'a [Link],
    anchor_refs: &[Ref],
    filter: &[String],
    single_commentary: bool,
) -> Vec<&'a Link> {
    let mut visible = links
        .iter()
        .filter(|link| {
            single_commentary
                || anchor_refs.iter().any(|anchor| anchor.same_location(&link.anchor_ref))
        })
        .filter(|link| {
            filter.is_empty()
                || filter.iter().any(|name| *name == link.category || *name == link.commentator)
        })
        .collect::<Vec<_>>();

    visible.sort_by(|a, b| {
        a.anchor_verse
            .cmp(&b.anchor_verse)
            .then_with(|| a.commentary_num.total_cmp(&b.commentary_num))
            .then_with(|| a.source_ref.as_str().cmp(b.source_ref.as_str()))
    });
    visible
}

/// Filter buttons to offer: recent filters first, the current filter forced in front
/// when it is not among them, at most `cap` entries.
pub fn top_filters(recent: &[String], current: &[String], cap: usize) -> Vec<String> {
    let mut top = recent.iter().take(cap).cloned().collect::<Vec<_>>();
    if let Some(current) = current.first() {
        if !top.contains(current) {
            top.insert(0, current.clone());
            top.truncate(cap);
        }
    }
    top
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{is_single_commentary, top_filters, visible_links};
    use crate::library::Link;
    use crate::model::fixtures::r;

    fn link(anchor: &str, source: &str, category: &str, commentator: &str, verse: u32) -> Link {
        Link {
            anchor_ref: r(anchor),
            source_ref: r(source),
            category: category.to_owned(),
            commentator: commentator.to_owned(),
            anchor_verse: verse,
            commentary_num: 0.0,
        }
    }

    #[fixture]
    fn links() -> Vec<Link> {
        vec![
            link("Genesis 1:2", "Rashi on Genesis 1:2:1", "Commentary", "Rashi", 2),
            link("Genesis 1:1", "Ramban on Genesis 1:1:1", "Commentary", "Ramban", 1),
            link("Genesis 1:1", "Rashi on Genesis 1:1:1", "Commentary", "Rashi", 1),
            link("Genesis 1:1", "Talmud Chagigah 12a", "Talmud", "Chagigah", 1),
        ]
    }

    fn sources(links: Vec<&Link>) -> Vec<&str> {
        links.into_iter().map(|link| link.source_ref.as_str()).collect()
    }

    #[rstest]
    fn only_links_on_the_anchor_are_listed(links: Vec<Link>) {
        let visible = visible_links(&links, &[r("Genesis 1:1")], &[], false);
        assert_eq!(
            sources(visible),
            vec!["Ramban on Genesis 1:1:1", "Rashi on Genesis 1:1:1", "Talmud Chagigah 12a"]
        );
    }

    #[rstest]
    fn filter_matches_category_or_commentator(links: Vec<Link>) {
        let talmud = visible_links(&links, &[r("Genesis 1:1")], &["Talmud".to_owned()], false);
        assert_eq!(sources(talmud), vec!["Talmud Chagigah 12a"]);

        let rashi = visible_links(&links, &[r("Genesis 1:1")], &["Rashi".to_owned()], false);
        assert_eq!(sources(rashi), vec!["Rashi on Genesis 1:1:1"]);
    }

    #[rstest]
    fn single_commentary_lists_the_whole_section_in_verse_order(links: Vec<Link>) {
        let filter = vec!["Rashi".to_owned()];
        assert!(is_single_commentary(&filter, &links));
        let visible = visible_links(&links, &[r("Genesis 1:1")], &filter, true);
        assert_eq!(sources(visible), vec!["Rashi on Genesis 1:1:1", "Rashi on Genesis 1:2:1"]);
    }

    #[rstest]
    fn categories_are_not_single_commentaries(links: Vec<Link>) {
        assert!(!is_single_commentary(&["Talmud".to_owned()], &links));
        assert!(!is_single_commentary(&["Rashi".to_owned(), "Ramban".to_owned()], &links));
    }

    #[rstest]
    #[case(&["a", "b"], &[], &["a", "b"])]
    #[case(&["a", "b"], &["b"], &["a", "b"])]
    #[case(&["a", "b"], &["z"], &["z", "a", "b"])]
    #[case(&["a", "b", "c", "d", "e", "f"], &["z"], &["z", "a", "b", "c", "d"])]
    fn current_filter_is_forced_to_the_front(
        #[case] recent: &[&str],
        #[case] current: &[&str],
        #[case] expected: &[&str],
    ) {
        let owned = |list: &[&str]| list.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>();
        assert_eq!(top_filters(&owned(recent), &owned(current), 5), owned(expected));
    }
}
