use sqlx::PgPool;

/// Connect, migrate, verify the pads table shape.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    faser_db::health_check(&pool).await.unwrap();

    let columns: Vec<(String, String)> = sqlx::query_as(
        "SELECT column_name::text, is_nullable::text
         FROM information_schema.columns
         WHERE table_name = 'pads'
         ORDER BY ordinal_position",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    let expected = [
        ("id", "NO"),
        ("created_at", "NO"),
        ("updated_at", "NO"),
        ("name", "NO"),
        ("port", "NO"),
        ("player_id", "YES"),
    ];
    assert_eq!(columns.len(), expected.len());
    for ((name, nullable), (want_name, want_nullable)) in columns.iter().zip(expected) {
        assert_eq!(name, want_name);
        assert_eq!(nullable, want_nullable, "nullability of {name}");
    }
}
