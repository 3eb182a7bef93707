//! End-to-end queries over the Team/Member fixture.

mod common;

use common::{setup, usernames, Member, Team};
use rowql::prelude::*;

#[test]
fn start_with_dynamic_paths() {
    let fx = setup();

    let entity = fx.db.store().catalog().entity(Member::NAME).unwrap();
    let username = entity.path("username").unwrap().eq("member1").unwrap();

    let found = fx
        .db
        .query()
        .select_from(Member::NAME)
        .where_(username)
        .fetch_one_as::<Member>()
        .unwrap()
        .unwrap();
    assert_eq!(found.username.as_deref(), Some("member1"));
}

#[test]
fn start_with_typed_paths() {
    let fx = setup();

    let found = fx
        .db
        .query()
        .select(Vec::<String>::new())
        .from(Member::NAME)
        .where_(Member::USERNAME.eq("member1"))
        .fetch_one_as::<Member>()
        .unwrap()
        .unwrap();
    assert_eq!(found.username.as_deref(), Some("member1"));
    assert_eq!(found.team, Some(fx.team_a));
}

#[test]
fn search_with_several_conditions() {
    let fx = setup();

    let found = fx
        .db
        .query()
        .select_from_entity::<Member>()
        .where_all([Member::USERNAME.eq("member1"), Member::AGE.eq(10)])
        .fetch_one_as::<Member>()
        .unwrap()
        .unwrap();
    assert_eq!(found.username.as_deref(), Some("member1"));

    // Chained where_ calls are the same conjunction.
    let chained = fx
        .db
        .query()
        .select_from_entity::<Member>()
        .where_(Member::USERNAME.eq("member1"))
        .where_(Member::AGE.eq(10))
        .plan()
        .unwrap();
    let listed = fx
        .db
        .query()
        .select_from_entity::<Member>()
        .where_all([Member::USERNAME.eq("member1"), Member::AGE.eq(10)])
        .plan()
        .unwrap();
    assert_eq!(chained, listed);

    let nobody = fx
        .db
        .query()
        .select_from_entity::<Member>()
        .where_all([Member::USERNAME.eq("member1"), Member::AGE.eq(20)])
        .fetch_one()
        .unwrap();
    assert_eq!(nobody, None);
}

#[test]
fn result_fetch() {
    let fx = setup();
    let query = fx.db.query().select_from_entity::<Member>();

    let all = query.fetch_as::<Member>().unwrap();
    assert_eq!(
        usernames(&all),
        vec![Some("member1"), Some("member2"), Some("member3"), Some("member4")]
    );

    assert_eq!(query.fetch_one(), Err(Error::NonUniqueResult(4)));

    let first = query.fetch_first().unwrap().unwrap();
    assert_eq!(
        Member::from_record(&first).unwrap().username.as_deref(),
        Some("member1")
    );

    let results = query.fetch_results().unwrap();
    assert_eq!(results.total, Some(4));
    assert_eq!(results.len(), 4);

    assert_eq!(query.fetch_count().unwrap(), 4);
}

#[test]
fn sort_by_age_desc_then_username_nulls_last() {
    let fx = setup();
    fx.db.persist(&Member::new(None, 100, None)).unwrap();
    fx.db.persist(&Member::new(Some("member5"), 100, None)).unwrap();
    fx.db.persist(&Member::new(Some("member6"), 100, None)).unwrap();

    let result = fx
        .db
        .query()
        .select_from_entity::<Member>()
        .where_(Member::AGE.eq(100))
        .order_by([Member::AGE.desc(), Member::USERNAME.asc().nulls_last()])
        .fetch_as::<Member>()
        .unwrap();

    assert_eq!(usernames(&result), vec![Some("member5"), Some("member6"), None]);
}

#[test]
fn paging() {
    let fx = setup();
    let query = fx
        .db
        .query()
        .select_from_entity::<Member>()
        .order_by([Member::USERNAME.desc()])
        .offset(1)
        .limit(2);

    let page = query.fetch_results().unwrap();
    assert_eq!(page.total, Some(4));
    assert_eq!(page.limit, Some(2));
    assert_eq!(page.offset, 1);
    assert_eq!(
        page.column("username"),
        vec![Value::from("member3"), Value::from("member2")]
    );

    // Limit zero yields nothing; the total still counts every match.
    let empty = query.clone().limit(0).fetch_results().unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.total, Some(4));

    assert!(matches!(
        query.clone().limit(-1).fetch(),
        Err(Error::InvalidPlan(_))
    ));
}

#[test]
fn projection_and_team_lookup() {
    let fx = setup();

    let rows = fx
        .db
        .query()
        .select(["username", "team"])
        .from(Member::NAME)
        .where_(Member::TEAM.eq(fx.team_b))
        .fetch()
        .unwrap();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.len(), 2);
        assert!(row.get("age").is_none());
        let team: Team = Team::from_record(&fx.db.store().follow(row, "team").unwrap().unwrap())
            .unwrap();
        assert_eq!(team.name, "teamB");
    }

    let team_a = fx
        .db
        .query()
        .select_from_entity::<Team>()
        .where_(Team::NAME_FIELD.eq("teamA"))
        .fetch_one()
        .unwrap()
        .unwrap();
    assert_eq!(team_a.id, fx.team_a);
}

#[test]
fn rejects_ill_typed_queries() {
    let fx = setup();

    let err = fx
        .db
        .query()
        .select_from_entity::<Member>()
        .where_(Predicate::eq("age", "ten"))
        .fetch()
        .unwrap_err();
    assert_eq!(
        err,
        Error::TypeMismatch {
            entity: "Member".into(),
            field: "age".into(),
            expected: "int32".into(),
            found: "string".into(),
        }
    );

    assert!(matches!(
        fx.db.query().query().where_(Member::AGE.eq(10)).fetch_count(),
        Err(Error::InvalidPlan(_))
    ));
    assert!(matches!(
        fx.db.query().select_from("Order").fetch(),
        Err(Error::InvalidPlan(_))
    ));
}

#[test]
fn duplicate_and_missing_keys() {
    let fx = setup();
    let store = fx.db.store();

    let existing = store.get(fx.team_a).unwrap();
    assert_eq!(store.insert(existing), Err(Error::DuplicateKey(fx.team_a)));

    let missing = RecordId(9_999);
    assert_eq!(store.get(missing), Err(Error::NotFound(missing)));
    assert!(matches!(
        fx.db.find::<Team>(missing),
        Err(Error::NotFound(_))
    ));
    assert_eq!(fx.db.find::<Team>(fx.team_b).unwrap(), Team::new("teamB"));
}
