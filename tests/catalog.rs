//! Catalog behaviour against the in-process store.

use cinema_server::models::{MovieId, MovieUpdate, NewMovie, SeatId, SeatStatus};
use cinema_server::store::{Catalog, MemoryStore, SeatLedger, StoreError};

fn new_movie(title: &str, genre: &str) -> NewMovie {
    NewMovie::new(title, genre, 7, Vec::new()).unwrap()
}

#[tokio::test]
async fn test_duplicate_title_is_rejected() {
    let store = MemoryStore::new();
    store
        .create(NewMovie::new("Dune", "sci-fi", 8, Vec::new()).unwrap())
        .await
        .unwrap();

    let err = store
        .create(NewMovie::new("Dune", "drama", 3, Vec::new()).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(ref title) if title == "Dune"));
    assert_eq!(store.latest(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_seeds_available_seats() {
    let store = MemoryStore::new();
    let seats = vec![SeatId::parse("A1").unwrap(), SeatId::parse("A2").unwrap()];
    let movie = store
        .create(NewMovie::new("Dune", "sci-fi", 8, seats).unwrap())
        .await
        .unwrap();

    assert_eq!(movie.tickets.len(), 2);
    assert!(movie
        .tickets
        .iter()
        .all(|t| t.status == SeatStatus::Available));
    assert_eq!(movie.created_at, movie.updated_at);
}

#[tokio::test]
async fn test_create_rejects_repeated_seats() {
    let store = MemoryStore::new();
    let seats = vec![SeatId::parse("A1").unwrap(), SeatId::parse("A1").unwrap()];
    let err = store
        .create(NewMovie::new("Dune", "sci-fi", 8, seats).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateSeat(_)));
}

#[tokio::test]
async fn test_get_after_delete_is_not_found() {
    let store = MemoryStore::new();
    let movie = store.create(new_movie("Heat", "crime")).await.unwrap();
    assert_eq!(store.get(movie.id).await.unwrap(), movie);

    store.delete(movie.id).await.unwrap();

    assert!(matches!(
        store.get(movie.id).await,
        Err(StoreError::NotFound(id)) if id == movie.id
    ));
    assert!(matches!(
        store.delete(movie.id).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.get(MovieId::new()).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_removes_tickets() {
    let store = MemoryStore::new();
    let movie = store
        .create(NewMovie::new("Heat", "crime", 8, vec![SeatId::parse("A1").unwrap()]).unwrap())
        .await
        .unwrap();
    store
        .reserve(movie.id, &SeatId::parse("A1").unwrap())
        .await
        .unwrap();

    store.delete(movie.id).await.unwrap();

    assert!(store.sold_tickets().await.unwrap().is_empty());
    assert!(matches!(
        store.tickets(movie.id).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_update_replaces_fields_and_keeps_tickets() {
    let store = MemoryStore::new();
    let movie = store
        .create(NewMovie::new("Heat", "crime", 8, vec![SeatId::parse("A1").unwrap()]).unwrap())
        .await
        .unwrap();

    let updated = store
        .update(movie.id, MovieUpdate::new("Heat (1995)", "thriller", 9).unwrap())
        .await
        .unwrap();

    assert_eq!(updated.title, "Heat (1995)");
    assert_eq!(updated.genre, "thriller");
    assert_eq!(updated.rating, 9);
    assert_eq!(updated.tickets, movie.tickets);
    assert_eq!(updated.created_at, movie.created_at);
    assert!(updated.updated_at >= movie.updated_at);
}

#[tokio::test]
async fn test_update_conflicts_and_missing() {
    let store = MemoryStore::new();
    let heat = store.create(new_movie("Heat", "crime")).await.unwrap();
    store.create(new_movie("Ronin", "crime")).await.unwrap();

    let err = store
        .update(heat.id, MovieUpdate::new("Ronin", "crime", 5).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));

    // Keeping its own title is not a conflict
    store
        .update(heat.id, MovieUpdate::new("Heat", "crime", 5).unwrap())
        .await
        .unwrap();

    let err = store
        .update(MovieId::new(), MovieUpdate::new("Solaris", "sci-fi", 5).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_latest_is_newest_first_and_bounded() {
    let store = MemoryStore::new();
    for title in ["One", "Two", "Three", "Four"] {
        store.create(new_movie(title, "drama")).await.unwrap();
    }

    let titles: Vec<String> = store
        .latest(3)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.title)
        .collect();
    assert_eq!(titles, vec!["Four", "Three", "Two"]);
    assert!(store.latest(0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_by_genre_filters_and_orders() {
    let store = MemoryStore::new();
    store.create(new_movie("Alien", "horror")).await.unwrap();
    store.create(new_movie("Heat", "crime")).await.unwrap();
    store.create(new_movie("The Thing", "horror")).await.unwrap();

    let titles: Vec<String> = store
        .by_genre("horror")
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.title)
        .collect();
    assert_eq!(titles, vec!["The Thing", "Alien"]);
    assert!(store.by_genre("western").await.unwrap().is_empty());
}
