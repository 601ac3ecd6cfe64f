#![cfg(feature = "rusqlite")]

mod common;

use common::{Post, User, setup_db, user};
use quarry::AccessKind;
use quarry::prelude::*;

fn both_strategies() -> [AccessKind; 2] {
    [AccessKind::Offset, AccessKind::Reflect]
}

fn seed(db: &DB, ctx: &Context) {
    let res = Inserter::new(db)
        .values([user(1, "ann", 30), user(2, "bob", 17), user(3, "cid", 45)])
        .exec(ctx, db);
    assert_eq!(res.rows_affected().unwrap(), 3);
    assert_eq!(res.last_insert_id().unwrap(), 3);
}

#[test]
fn test_insert_and_select() {
    for access in both_strategies() {
        let db = setup_db(access);
        let ctx = Context::background();
        seed(&db, &ctx);

        let adults: Vec<User> = Selector::new(&db)
            .r#where([c("age").gt(18)])
            .get_multi(&ctx, &db)
            .unwrap();
        let names: Vec<_> = adults.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["ann", "cid"], "{access:?}");

        let bob: User = Selector::new(&db)
            .r#where([c("name").eq("bob")])
            .get(&ctx, &db)
            .unwrap();
        assert_eq!(bob, user(2, "bob", 17));

        let err = Selector::<User>::new(&db)
            .r#where([c("id").eq(99)])
            .get(&ctx, &db)
            .unwrap_err();
        assert!(matches!(err, OrmError::NoRowsFound));
    }
}

#[test]
fn test_partial_projection_and_paging() {
    let db = setup_db(AccessKind::Offset);
    let ctx = Context::background();
    seed(&db, &ctx);

    let page: Vec<User> = Selector::new(&db)
        .select([c("id"), c("name")])
        .limit(1)
        .offset(1)
        .get_multi(&ctx, &db)
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name, "bob");
    // unselected fields keep their defaults
    assert_eq!(page[0].age, 0);
}

#[test]
fn test_tagged_columns_round_trip() {
    for access in both_strategies() {
        let db = setup_db(access);
        let ctx = Context::background();
        let post = Post {
            id: 1,
            user_id: 7,
            title: "hello".into(),
            score: 4.5,
            published: true,
            body: Some(vec![0xde, 0xad]),
        };
        Inserter::new(&db)
            .values([post.clone()])
            .exec(&ctx, &db)
            .into_result()
            .unwrap();
        let loaded: Post = Selector::new(&db)
            .r#where([c("user_id").eq(7)])
            .get(&ctx, &db)
            .unwrap();
        assert_eq!(loaded, post, "{access:?}");
    }
}

#[test]
fn test_update_and_delete() {
    let db = setup_db(AccessKind::Reflect);
    let ctx = Context::background();
    seed(&db, &ctx);

    let res = Updater::new(&db)
        .update(User {
            email: Some("ann@example.com".into()),
            ..user(1, "ann", 31)
        })
        .set([c("age").into(), c("email").into()])
        .r#where([c("id").eq(1)])
        .exec(&ctx, &db);
    assert_eq!(res.rows_affected().unwrap(), 1);

    let res = Updater::<User>::new(&db)
        .set([assign("age", c("age").add(1)).into()])
        .r#where([c("name").eq("bob")])
        .exec(&ctx, &db);
    assert_eq!(res.rows_affected().unwrap(), 1);

    let users: Vec<User> = Selector::new(&db).get_multi(&ctx, &db).unwrap();
    assert_eq!(users[0].age, 31);
    assert_eq!(users[0].email.as_deref(), Some("ann@example.com"));
    assert_eq!(users[1].age, 18);

    let res = Deleter::<User>::new(&db)
        .r#where([c("age").lt(20)])
        .exec(&ctx, &db);
    assert_eq!(res.rows_affected().unwrap(), 1);
    let left: Vec<User> = Selector::new(&db).get_multi(&ctx, &db).unwrap();
    assert_eq!(left.len(), 2);
}

#[test]
fn test_sqlite_upsert() {
    let db = setup_db(AccessKind::Offset);
    let ctx = Context::background();
    seed(&db, &ctx);

    Inserter::new(&db)
        .values([user(1, "ann", 99)])
        .on_duplicate_key()
        .conflict_columns(["id"])
        .update([c("age").into()])
        .exec(&ctx, &db)
        .into_result()
        .unwrap();

    let ann: User = Selector::new(&db)
        .r#where([c("id").eq(1)])
        .get(&ctx, &db)
        .unwrap();
    assert_eq!(ann.age, 99);
    let count: Vec<User> = Selector::new(&db).get_multi(&ctx, &db).unwrap();
    assert_eq!(count.len(), 3);
}

#[test]
fn test_raw_querier() {
    let db = setup_db(AccessKind::Offset);
    let ctx = Context::background();
    seed(&db, &ctx);

    let users: Vec<User> = RawQuerier::new(
        &db,
        "SELECT id, name FROM user WHERE age > ? ORDER BY id DESC",
        [Value::Int(20)],
    )
    .get_multi(&ctx, &db)
    .unwrap();
    let ids: Vec<_> = users.iter().map(|u| u.id).collect();
    assert_eq!(ids, [3, 1]);

    let err = RawQuerier::<User>::new(&db, "SELECT id, name AS nickname FROM user", [])
        .get(&ctx, &db)
        .unwrap_err();
    assert!(matches!(err, OrmError::UnknownColumn(c) if c == "nickname"));
}

#[test]
fn test_subquery_filter() {
    let db = setup_db(AccessKind::Offset);
    let ctx = Context::background();
    seed(&db, &ctx);
    Inserter::new(&db)
        .values([Post {
            id: 1,
            user_id: 3,
            title: "t".into(),
            ..Post::default()
        }])
        .exec(&ctx, &db)
        .into_result()
        .unwrap();

    let authors = Selector::<Post>::new(&db)
        .select([c("user_id")])
        .as_subquery("authors");
    let users: Vec<User> = Selector::new(&db)
        .r#where([c("id").in_query(authors)])
        .get_multi(&ctx, &db)
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "cid");
}

#[test]
fn test_do_tx_commit_and_rollback() {
    let db = setup_db(AccessKind::Offset);
    let ctx = Context::background();

    db.do_tx(&ctx, |tx| {
        Inserter::new(tx)
            .values([user(1, "ann", 30)])
            .exec(&ctx, tx)
            .into_result()?;
        Ok(())
    })
    .unwrap();

    let err = db
        .do_tx(&ctx, |tx| -> quarry::Result<()> {
            Inserter::new(tx)
                .values([user(2, "bob", 17)])
                .exec(&ctx, tx)
                .into_result()?;
            // duplicate primary key
            Inserter::new(tx)
                .values([user(1, "cid", 50)])
                .exec(&ctx, tx)
                .into_result()?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, OrmError::Driver(_)));

    let users: Vec<User> = Selector::new(&db).get_multi(&ctx, &db).unwrap();
    assert_eq!(users, [user(1, "ann", 30)]);
}

#[test]
fn test_tx_dropped_rolls_back() {
    let db = setup_db(AccessKind::Offset);
    let ctx = Context::background();
    {
        let tx = db.begin_tx(&ctx).unwrap();
        Inserter::new(&tx)
            .values([user(1, "ann", 30)])
            .exec(&ctx, &tx)
            .into_result()
            .unwrap();
    }
    let users: Vec<User> = Selector::new(&db).get_multi(&ctx, &db).unwrap();
    assert!(users.is_empty());
}

#[cfg(feature = "tracing")]
#[test]
fn test_tx_events_name_the_driver() {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("quarry=info")
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        let db = setup_db(AccessKind::Offset);
        let ctx = Context::background();
        db.begin_tx(&ctx).unwrap().commit().unwrap();
    });

    let out = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
    assert!(out.contains("driver=\"rusqlite\""), "{out}");
    assert!(out.contains("event=\"begin\""), "{out}");
    assert!(out.contains("event=\"commit\""), "{out}");
}
