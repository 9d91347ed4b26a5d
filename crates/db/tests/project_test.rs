//! Integration tests for project persistence.

mod common;

use std::collections::HashSet;

use rust_decimal_macros::dec;
use salesdesk_core::division::Division;
use salesdesk_core::month::YearMonth;
use salesdesk_core::project::{
    PlannedRevenue, ProjectStatus, ProjectType, SalesStage, SphReleaseStatus, ValidatedProject,
};
use salesdesk_core::revenue::{RealizationInput, plan_realization};
use salesdesk_db::ProjectRepository;
use salesdesk_db::repositories::ProjectRepoError;

fn month(value: &str) -> YearMonth {
    YearMonth::parse(value).expect("valid month")
}

fn project(division: Division, plans: &[(&str, rust_decimal::Decimal)]) -> ValidatedProject {
    ValidatedProject {
        description: "Fiber backbone upgrade".to_string(),
        customer_id: None,
        division,
        status: ProjectStatus::Prospect,
        project_type: ProjectType::ProjectBased,
        sales_stage: SalesStage::new(3).expect("valid stage"),
        sph_status: None,
        sph_release_date: None,
        sph_release_status: SphReleaseStatus::No,
        sph_number: None,
        reason_category: None,
        reason_note: None,
        revenue_plans: plans
            .iter()
            .map(|(m, target)| PlannedRevenue {
                month: month(m),
                target_revenue: *target,
            })
            .collect(),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_allocates_sequential_codes() {
    let repo = ProjectRepository::new(common::connect().await);
    let input = project(Division::ItSolutions, &[("2091-01", dec!(100))]);

    let first = repo.create_with_plans(&input, 2091).await.expect("create");
    let second = repo.create_with_plans(&input, 2091).await.expect("create");

    assert!(first.project_code.starts_with("PRJ-ITS-2091-"));
    let seq = |code: &str| code.rsplit('-').next().unwrap().parse::<u32>().unwrap();
    assert_eq!(seq(&second.project_code), seq(&first.project_code) + 1);
    assert_eq!(first.division, "IT Solutions");

    repo.delete(first.id).await.expect("delete");
    repo.delete(second.id).await.expect("delete");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_creates_get_distinct_codes() {
    let repo = ProjectRepository::new(common::connect().await);
    let input = project(Division::NetCo, &[]);

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let repo = repo.clone();
            let input = input.clone();
            tokio::spawn(async move { repo.create_with_plans(&input, 2092).await })
        })
        .collect();

    let mut created = Vec::new();
    for handle in handles {
        created.push(handle.await.expect("join").expect("create"));
    }

    let codes: HashSet<_> = created.iter().map(|p| p.project_code.clone()).collect();
    assert_eq!(codes.len(), created.len());

    for p in created {
        repo.delete(p.id).await.expect("delete");
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_keeps_realization_of_surviving_months() {
    let repo = ProjectRepository::new(common::connect().await);
    let created = repo
        .create_with_plans(
            &project(Division::NetCo, &[("2093-01", dec!(100)), ("2093-02", dec!(200))]),
            2093,
        )
        .await
        .expect("create");

    let plan = plan_realization(
        "2093-01",
        &RealizationInput {
            realization: dec!(80),
            apply_month: None,
            move_from_source: false,
        },
    )
    .expect("plan");
    repo.apply_realization(created.id, &plan).await.expect("realize");

    repo.update_with_plans(
        created.id,
        &project(Division::NetCo, &[("2093-01", dec!(150)), ("2093-03", dec!(50))]),
    )
    .await
    .expect("update");

    let plans = repo.revenue_plans(created.id).await.expect("plans");
    let months: Vec<String> = plans.iter().map(|p| p.month.to_string()).collect();
    assert_eq!(months, ["2093-01", "2093-03"]);
    assert_eq!(plans[0].target_revenue, dec!(150));
    assert_eq!(plans[0].target_realization, dec!(80));
    assert_eq!(plans[1].target_realization, dec!(0));

    repo.delete(created.id).await.expect("delete");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_moved_realization_is_not_double_counted() {
    let repo = ProjectRepository::new(common::connect().await);
    let created = repo
        .create_with_plans(&project(Division::NetCo, &[("2094-05", dec!(500))]), 2094)
        .await
        .expect("create");

    let book = |source: &str, apply: Option<&str>, amount| {
        plan_realization(
            source,
            &RealizationInput {
                realization: amount,
                apply_month: apply.map(str::to_string),
                move_from_source: apply.is_some(),
            },
        )
        .expect("plan")
    };

    repo.apply_realization(created.id, &book("2094-05", None, dec!(300)))
        .await
        .expect("realize");
    repo.apply_realization(created.id, &book("2094-05", Some("2094-07"), dec!(300)))
        .await
        .expect("move");

    let plans = repo.revenue_plans(created.id).await.expect("plans");
    let total: rust_decimal::Decimal = plans.iter().map(|p| p.target_realization).sum();
    assert_eq!(total, dec!(300));
    assert_eq!(plans.len(), 2);

    repo.delete(created.id).await.expect("delete");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_missing_project_is_not_found() {
    let repo = ProjectRepository::new(common::connect().await);
    assert!(matches!(
        repo.scope(i64::MAX).await,
        Err(ProjectRepoError::NotFound(_))
    ));
    assert!(matches!(
        repo.delete(i64::MAX).await,
        Err(ProjectRepoError::NotFound(_))
    ));
}
