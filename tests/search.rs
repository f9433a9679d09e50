use futures::executor::block_on;
use gateway_search::config::CACHE_DURATION_MS;
use gateway_search::{DebouncedSearch, SearchConfig, SearchOutcome, SearchStep};
use std::cell::Cell;

fn job_search(calls: &Cell<usize>) -> impl Fn(String) -> futures::future::Ready<SearchOutcome<Vec<String>>> + '_ {
    move |term: String| {
        calls.set(calls.get() + 1);
        futures::future::ready(Ok(vec![format!("{term} jobs")]))
    }
}

#[test]
fn repeated_term_is_served_from_cache() {
    let calls = Cell::new(0);
    let search = job_search(&calls);
    let mut session = DebouncedSearch::default();

    let step = block_on(session.run("dubai", || 0.0, &search));
    assert!(matches!(step, SearchStep::Fetch(_)));
    assert_eq!(calls.get(), 1);

    block_on(session.run("abu dhabi", || 1_000.0, &search));
    let step = block_on(session.run("dubai", || 60_000.0, &search));

    assert_eq!(step, SearchStep::CacheHit);
    assert_eq!(calls.get(), 2);
    assert_eq!(session.state().results, Some(vec!["dubai jobs".to_string()]));
    assert!(session.state().from_cache);
    assert!(!session.state().is_searching);
}

#[test]
fn expired_entry_searches_again() {
    let calls = Cell::new(0);
    let search = job_search(&calls);
    let mut session = DebouncedSearch::default();

    block_on(session.run("dubai", || 0.0, &search));
    block_on(session.run("", || 10.0, &search));
    let step = block_on(session.run("dubai", || CACHE_DURATION_MS + 1.0, &search));

    assert!(matches!(step, SearchStep::Fetch(_)));
    assert_eq!(calls.get(), 2);
    assert!(!session.state().from_cache);
}

#[test]
fn cache_holds_at_most_fifty_and_drops_the_oldest() {
    let calls = Cell::new(0);
    let search = job_search(&calls);
    let mut session = DebouncedSearch::default();

    for i in 0..51 {
        block_on(session.run(&format!("term-{i}"), || f64::from(i) * 10.0, &search));
    }

    assert_eq!(session.cache().len(), 50);
    assert!(!session.cache().contains("term-0"));
    assert!(session.cache().contains("term-1"));
    assert!(session.cache().contains("term-50"));
}

#[test]
fn cached_entry_is_stamped_when_the_search_resolves() {
    let clock = Cell::new(0.0);
    let mut session = DebouncedSearch::<Vec<String>>::default();

    block_on(session.run("scholarship", || clock.get(), |term| {
        // The search takes ten seconds.
        clock.set(10_000.0);
        futures::future::ready(Ok(vec![term]))
    }));

    assert!(session.cache().get("scholarship", CACHE_DURATION_MS + 5_000.0).is_some());
    assert!(session.cache().get("scholarship", CACHE_DURATION_MS + 10_000.0).is_none());
}

#[test]
fn clear_cache_forces_a_new_search() {
    let calls = Cell::new(0);
    let search = job_search(&calls);
    let mut session = DebouncedSearch::default();

    block_on(session.run("mentor", || 0.0, &search));
    session.clear_cache();
    assert!(session.cache().is_empty());

    block_on(session.run("", || 1.0, &search));
    block_on(session.run("mentor", || 2.0, &search));
    assert_eq!(calls.get(), 2);
}

#[test]
fn empty_term_never_calls_search() {
    let calls = Cell::new(0);
    let search = job_search(&calls);
    let mut session = DebouncedSearch::default();

    let step = block_on(session.run("", || 0.0, &search));
    assert_eq!(step, SearchStep::Cleared);
    assert_eq!(calls.get(), 0);
    assert_eq!(session.state().results, None);
}

#[test]
fn failed_search_surfaces_message() {
    let mut session = DebouncedSearch::<Vec<String>>::default();
    block_on(session.run("pilot", || 0.0, |_| async { Ok(vec!["pilot jobs".to_string()]) }));
    block_on(session.run("astronaut", || 1.0, |_| async { Err("service unavailable".to_string()) }));

    assert_eq!(session.state().error.as_deref(), Some("service unavailable"));
    assert_eq!(session.state().results, Some(vec!["pilot jobs".to_string()]));
    assert!(!session.cache().contains("astronaut"));
}

#[test]
fn debounced_input_settles_on_last_keystroke() {
    let mut session = DebouncedSearch::<Vec<String>>::new(SearchConfig::with_delay(300));

    session.input("a", 0.0);
    session.input("ab", 100.0);
    session.input("abc", 150.0);
    assert_eq!(session.poll(449.0), None);

    let Some(SearchStep::Fetch(ticket)) = session.poll(450.0) else {
        panic!("expected a search for the settled term");
    };
    assert_eq!(ticket.term(), "abc");

    assert!(session.complete(ticket, Ok(vec!["abc".into()]), 500.0));
    assert_eq!(session.state().debounced_term, "abc");
}
