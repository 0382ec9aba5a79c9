use conduit_core::{FeedAction, FeedEndpoint, FeedState, PlannedFetch, Tab};

#[test]
fn changing_filters_resets_page() {
    let mut state = FeedState::default();
    assert!(state.reduce(FeedAction::GoToPage(4)).refetch);
    assert_eq!(state.current_page, 4);

    let transition = state.reduce(FeedAction::ToggleTag("rust".into()));
    assert!(transition.refetch);
    assert_eq!(transition.fragment.as_deref(), Some("rust"));
    assert_eq!(state.current_page, 1);
    assert_eq!(state.active_tab, Tab::Tag);
}

#[test]
fn page_zero_is_page_one() {
    let mut state = FeedState::default();
    assert!(!state.reduce(FeedAction::GoToPage(0)).refetch);
    assert_eq!(state.current_page, 1);
}

#[test]
fn fragment_change_never_publishes_fragment() {
    let mut state = FeedState::default();
    let transition = state.reduce(FeedAction::FragmentChanged("#go,rust".into()));
    assert!(transition.refetch);
    assert_eq!(transition.fragment, None);
    assert_eq!(state.selected_tags, vec!["go", "rust"]);
}

#[test]
fn plan_uses_offset_limit_and_tags() {
    let mut state = FeedState::default();
    state.reduce(FeedAction::SelectTags(vec!["rust".into(), "go".into()]));
    state.reduce(FeedAction::GoToPage(2));

    match state.plan_fetch(false) {
        PlannedFetch::Request(request) => {
            assert_eq!(request.endpoint, FeedEndpoint::Global);
            assert_eq!(request.offset, 10);
            assert_eq!(request.limit, 10);
            assert_eq!(request.tag.as_deref(), Some("rust,go"));
        }
        other => panic!("unexpected plan {other:?}"),
    }
}

#[test]
fn empty_tag_tab_plans_global_fallback() {
    let state = FeedState {
        active_tab: Tab::Tag,
        ..FeedState::default()
    };
    assert_eq!(state.plan_fetch(true), PlannedFetch::FallBackToGlobal);

    let mut state = state;
    assert!(state.reduce(FeedAction::TagSelectionEmptied).refetch);
    assert_eq!(state.active_tab, Tab::Global);
}

#[test]
fn other_tabs_read_the_global_listing() {
    for tab in [Tab::Favorited, Tab::MyArticles, Tab::FavoritedArticles, Tab::Feed] {
        let mut state = FeedState::default();
        state.reduce(FeedAction::SelectTab(tab));
        assert_eq!(state.active_tab, tab);
        match state.plan_fetch(true) {
            PlannedFetch::Request(request) => assert_eq!(request.endpoint, FeedEndpoint::Global),
            other => panic!("unexpected plan {other:?}"),
        }
    }
}

#[test]
fn page_count_is_at_least_one() {
    let mut state = FeedState::default();
    assert_eq!(state.page_count(), 1);
    state.total_count = 10;
    assert_eq!(state.page_count(), 1);
    state.total_count = 11;
    assert_eq!(state.page_count(), 2);
}

#[test]
fn huge_page_is_clamped_to_an_addressable_offset() {
    let mut state = FeedState::default();
    assert!(state.reduce(FeedAction::GoToPage(u32::MAX)).refetch);
    assert_eq!(state.current_page, u32::MAX / 10 + 1);

    match state.plan_fetch(false) {
        PlannedFetch::Request(request) => {
            assert_eq!(request.offset, (u32::MAX / 10) * 10);
            assert_eq!(request.limit, 10);
        }
        other => panic!("unexpected plan {other:?}"),
    }
}

#[test]
fn oversized_page_field_saturates_offset() {
    let state = FeedState {
        current_page: 500_000_000,
        ..FeedState::default()
    };
    match state.plan_fetch(false) {
        PlannedFetch::Request(request) => assert_eq!(request.offset, u32::MAX),
        other => panic!("unexpected plan {other:?}"),
    }
}
