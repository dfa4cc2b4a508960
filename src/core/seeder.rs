//! Bulk demo data for load testing.
//!
//! Generates organizations, users spread across them and files owned by a
//! member of the file's organization. Rows go in through multi-row
//! `INSERT .. VALUES` batches built with `sqlx::QueryBuilder`.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use fake::faker::boolean::en::Boolean;
use fake::Fake;
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const PLANS: [&str; 3] = ["free", "pro", "enterprise"];
const ROLES: [&str; 3] = ["designer", "developer", "manager"];
const FILE_TYPES: [&str; 3] = ["design", "prototype", "component"];

/// Keeps every batch well below PostgreSQL's 65535 bind parameters
const MAX_BATCH_SIZE: usize = 5_000;

/// How many rows of each kind to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    pub organizations: usize,
    pub users: usize,
    pub files: usize,
    pub batch_size: usize,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            organizations: 100,
            users: 10_000,
            files: 100_000,
            batch_size: 1_000,
        }
    }
}

impl SeedPlan {
    fn batch(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }
}

/// Row counts after seeding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub organizations: i64,
    pub users: i64,
    pub files: i64,
    pub comments: i64,
    pub activity_logs: i64,
}

/// Random element of a non-empty slice
fn pick<T: Copy>(items: &[T]) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    items.get((0..items.len()).fake::<usize>()).copied()
}

fn days_ago(max_days: i64) -> chrono::DateTime<Utc> {
    Utc::now() - Duration::days((0..=max_days).fake::<i64>())
}

/// Populate the database according to `plan`
///
/// User emails follow `user{n}@example.com`; rows whose email is already
/// taken are skipped, so running the seeder twice adds no duplicate users.
pub async fn seed(pool: &PgPool, plan: &SeedPlan) -> Result<SeedReport, sqlx::Error> {
    let organization_ids = seed_organizations(pool, plan).await?;
    tracing::info!("Created {} organizations", organization_ids.len());

    seed_users(pool, plan, &organization_ids).await?;
    let members = members_by_organization(pool, &organization_ids).await?;

    let files = seed_files(pool, plan, &organization_ids, &members).await?;
    tracing::info!("Created {} files", files);

    let report = count_rows(pool).await?;
    tracing::info!(
        organizations = report.organizations,
        users = report.users,
        files = report.files,
        comments = report.comments,
        activity_logs = report.activity_logs,
        "Seed completed"
    );
    Ok(report)
}

async fn seed_organizations(pool: &PgPool, plan: &SeedPlan) -> Result<Vec<Uuid>, sqlx::Error> {
    let mut ids = Vec::with_capacity(plan.organizations);

    for start in (0..plan.organizations).step_by(plan.batch()) {
        let end = (start + plan.batch()).min(plan.organizations);

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO organizations (name, plan) ");
        builder.push_values(start..end, |mut row, i| {
            row.push_bind(format!("Company {i}"))
                .push_bind(pick(&PLANS).map(str::to_string));
        });
        builder.push(" RETURNING id");

        let batch: Vec<Uuid> = builder.build_query_scalar().fetch_all(pool).await?;
        ids.extend(batch);
    }

    Ok(ids)
}

async fn seed_users(
    pool: &PgPool,
    plan: &SeedPlan,
    organization_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    for start in (0..plan.users).step_by(plan.batch()) {
        let end = (start + plan.batch()).min(plan.users);

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO users (email, name, organization_id, avatar_url, last_login, metadata) ",
        );
        builder.push_values(start..end, |mut row, i| {
            row.push_bind(format!("user{i}@example.com"))
                .push_bind(format!("User {i}"))
                .push_bind(pick(organization_ids))
                .push_bind(format!("https://i.pravatar.cc/150?img={i}"))
                .push_bind(days_ago(30))
                .push_bind(json!({ "role": pick(&ROLES) }));
        });
        builder.push(" ON CONFLICT (email) DO NOTHING");

        builder.build().execute(pool).await?;
        tracing::info!("Inserted {} users", end);
    }

    Ok(())
}

/// User ids grouped by organization, for picking file owners
async fn members_by_organization(
    pool: &PgPool,
    organization_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Uuid>>, sqlx::Error> {
    let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
        "SELECT id, organization_id FROM users WHERE organization_id = ANY($1)",
    )
    .bind(organization_ids)
    .fetch_all(pool)
    .await?;

    let mut members: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (user_id, organization_id) in rows {
        members.entry(organization_id).or_default().push(user_id);
    }
    Ok(members)
}

struct FileRow {
    name: String,
    owner_id: Uuid,
    organization_id: Uuid,
}

/// Insert files; a draw that lands on an organization without members is skipped
async fn seed_files(
    pool: &PgPool,
    plan: &SeedPlan,
    organization_ids: &[Uuid],
    members: &HashMap<Uuid, Vec<Uuid>>,
) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;

    for start in (0..plan.files).step_by(plan.batch()) {
        let end = (start + plan.batch()).min(plan.files);

        let rows: Vec<FileRow> = (start..end)
            .filter_map(|i| {
                let organization_id = pick(organization_ids)?;
                let owner_id = pick(members.get(&organization_id)?)?;
                Some(FileRow {
                    name: format!("Design File {i}"),
                    owner_id,
                    organization_id,
                })
            })
            .collect();
        if rows.is_empty() {
            continue;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO files (name, owner_id, organization_id, version, is_public, \
             view_count, last_modified, metadata, created_at) ",
        );
        builder.push_values(rows, |mut row, file| {
            row.push_bind(file.name)
                .push_bind(file.owner_id)
                .push_bind(file.organization_id)
                .push_bind((1..=50).fake::<i32>())
                .push_bind(Boolean(30).fake::<bool>())
                .push_bind((0..=10_000).fake::<i64>())
                .push_bind(days_ago(90))
                .push_bind(json!({ "type": pick(&FILE_TYPES) }))
                .push_bind(days_ago(365));
        });

        inserted += builder.build().execute(pool).await?.rows_affected();
        tracing::info!("Inserted {} files", inserted);
    }

    Ok(inserted)
}

async fn count_rows(pool: &PgPool) -> Result<SeedReport, sqlx::Error> {
    let count = move |table: &'static str| async move {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
    };

    Ok(SeedReport {
        organizations: count("organizations").await?,
        users: count("users").await?,
        files: count("files").await?,
        comments: count("comments").await?,
        activity_logs: count("activity_logs").await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(organizations: usize, users: usize, files: usize, batch_size: usize) -> SeedPlan {
        SeedPlan {
            organizations,
            users,
            files,
            batch_size,
        }
    }

    #[test]
    fn test_batch_size_is_clamped() {
        assert_eq!(plan(1, 1, 1, 0).batch(), 1);
        assert_eq!(plan(1, 1, 1, 1_000_000).batch(), MAX_BATCH_SIZE);
        assert_eq!(SeedPlan::default().batch(), 1_000);
    }

    #[test]
    fn test_pick_from_empty_slice() {
        assert_eq!(pick::<u8>(&[]), None);
        assert!(PLANS.contains(&pick(&PLANS).unwrap()));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_seed_fills_tables_in_batches(pool: PgPool) {
        let report = seed(&pool, &plan(3, 25, 40, 7)).await.unwrap();

        assert_eq!(report.organizations, 3);
        assert_eq!(report.users, 25);
        assert!(report.files > 0 && report.files <= 40);
        assert_eq!(report.comments, 0);
        assert_eq!(report.activity_logs, 0);

        // Every file is owned by a member of its own organization
        let strangers: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM files f
            JOIN users u ON u.id = f.owner_id
            WHERE u.organization_id <> f.organization_id
            "#,
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(strangers, 0);

        let plans: Vec<Option<String>> =
            sqlx::query_scalar("SELECT DISTINCT plan FROM organizations")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert!(plans
            .iter()
            .all(|p| p.as_deref().is_some_and(|p| PLANS.contains(&p))));

        let role: Option<String> =
            sqlx::query_scalar("SELECT metadata->>'role' FROM users LIMIT 1")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(role.is_some_and(|r| ROLES.contains(&r.as_str())));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_reseeding_skips_taken_emails(pool: PgPool) {
        seed(&pool, &plan(2, 10, 0, 4)).await.unwrap();
        let report = seed(&pool, &plan(2, 10, 5, 4)).await.unwrap();

        assert_eq!(report.organizations, 4);
        assert_eq!(report.users, 10);
        // Second-round organizations have no members of their own
        assert_eq!(report.files, 0);
    }
}
