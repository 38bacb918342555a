//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool, Transaction};

use crate::errors::AppError;
use crate::models::{
    invalid_redactor_choice, Account, EntityCounts, NewRedactor, Newspaper, NewspaperDetail,
    NewspaperInput, NewspaperWithTopic, Redactor, RedactorChanges, RedactorWithNewspapers, Topic,
    TopicInput, INVALID_TOPIC, TOPIC_NAME_TAKEN, USERNAME_TAKEN,
};
use crate::search::{fold_case, SearchFilter};
use crate::validation::FieldErrors;

const TOPIC_COLUMNS: &str = "topics.id, topics.name";

const NEWSPAPER_WITH_TOPIC_COLUMNS: &str = "newspapers.id, newspapers.title, newspapers.context, \
     newspapers.published_date, newspapers.topic_id, topics.name AS topic_name";

const REDACTOR_COLUMNS: &str = "redactors.id, redactors.username, redactors.first_name, \
     redactors.last_name, redactors.password_hash, redactors.years_of_experience, \
     redactors.is_featured, redactors.date_joined";

const NEWSPAPER_ORDER: &str =
    "ORDER BY newspapers.published_date DESC, newspapers.title, newspapers.id";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Count every entity kind in one round trip.
    pub async fn count_all(&self) -> Result<EntityCounts, AppError> {
        let row = sqlx::query(
            r#"SELECT (SELECT COUNT(*) FROM redactors) AS redactors,
                      (SELECT COUNT(*) FROM newspapers) AS newspapers,
                      (SELECT COUNT(*) FROM topics) AS topics"#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(EntityCounts {
            redactors: row.try_get("redactors")?,
            newspapers: row.try_get("newspapers")?,
            topics: row.try_get("topics")?,
        })
    }

    // ==================== TOPIC OPERATIONS ====================

    /// Count topics matching the filter.
    pub async fn count_topics(&self, filter: &SearchFilter) -> Result<i64, AppError> {
        let sql = format!(
            "SELECT COUNT(*) AS count FROM topics {}",
            filter.where_clause()
        );
        let row = filter.bind(sqlx::query(&sql)).fetch_one(&self.pool).await?;
        Ok(row.try_get("count")?)
    }

    /// List one page of topics matching the filter, ordered by name.
    pub async fn list_topics(
        &self,
        filter: &SearchFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Topic>, AppError> {
        let sql = format!(
            "SELECT {} FROM topics {} ORDER BY topics.name LIMIT ? OFFSET ?",
            TOPIC_COLUMNS,
            filter.where_clause()
        );
        let rows = filter
            .bind(sqlx::query(&sql))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        collect_rows(&rows, topic_from_row)
    }

    /// Get a topic by ID.
    pub async fn get_topic(&self, id: &str) -> Result<Option<Topic>, AppError> {
        let sql = format!("SELECT {} FROM topics WHERE id = ?", TOPIC_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(topic_from_row).transpose()?)
    }

    /// Whether another topic already uses this exact name.
    pub async fn topic_name_taken(
        &self,
        name: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM topics WHERE name = ? AND id IS NOT ?")
            .bind(name)
            .bind(exclude_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Create a new topic.
    pub async fn create_topic(&self, input: &TopicInput) -> Result<Topic, AppError> {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO topics (id, name, name_folded) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(&input.name)
            .bind(fold_case(&input.name))
            .execute(&self.pool)
            .await
            .map_err(|e| unique_violation(e, "name", TOPIC_NAME_TAKEN))?;

        Ok(Topic {
            id,
            name: input.name.clone(),
        })
    }

    /// Rename a topic.
    pub async fn update_topic(&self, id: &str, input: &TopicInput) -> Result<Topic, AppError> {
        let result = sqlx::query("UPDATE topics SET name = ?, name_folded = ? WHERE id = ?")
            .bind(&input.name)
            .bind(fold_case(&input.name))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| unique_violation(e, "name", TOPIC_NAME_TAKEN))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Topic {} not found", id)));
        }

        Ok(Topic {
            id: id.to_string(),
            name: input.name.clone(),
        })
    }

    /// Delete a topic together with every newspaper filed under it.
    pub async fn delete_topic(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM topics WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Topic {} not found", id)));
        }

        Ok(())
    }

    // ==================== NEWSPAPER OPERATIONS ====================

    /// Count newspapers matching the filter.
    pub async fn count_newspapers(&self, filter: &SearchFilter) -> Result<i64, AppError> {
        let sql = format!(
            "SELECT COUNT(*) AS count FROM newspapers {}",
            filter.where_clause()
        );
        let row = filter.bind(sqlx::query(&sql)).fetch_one(&self.pool).await?;
        Ok(row.try_get("count")?)
    }

    /// List one page of newspapers matching the filter, each with its topic.
    pub async fn list_newspapers(
        &self,
        filter: &SearchFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NewspaperWithTopic>, AppError> {
        let sql = format!(
            "SELECT {} FROM newspapers JOIN topics ON topics.id = newspapers.topic_id {} {} LIMIT ? OFFSET ?",
            NEWSPAPER_WITH_TOPIC_COLUMNS,
            filter.where_clause(),
            NEWSPAPER_ORDER
        );
        let rows = filter
            .bind(sqlx::query(&sql))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        collect_rows(&rows, newspaper_with_topic_from_row)
    }

    /// Most recently published newspapers first.
    pub async fn latest_newspapers(&self, limit: i64) -> Result<Vec<NewspaperWithTopic>, AppError> {
        let sql = format!(
            "SELECT {} FROM newspapers JOIN topics ON topics.id = newspapers.topic_id {} LIMIT ?",
            NEWSPAPER_WITH_TOPIC_COLUMNS, NEWSPAPER_ORDER
        );
        let rows = sqlx::query(&sql).bind(limit).fetch_all(&self.pool).await?;

        collect_rows(&rows, newspaper_with_topic_from_row)
    }

    /// Get a newspaper with its topic and assigned redactors.
    pub async fn get_newspaper(&self, id: &str) -> Result<Option<NewspaperDetail>, AppError> {
        let sql = format!(
            "SELECT {} FROM newspapers JOIN topics ON topics.id = newspapers.topic_id WHERE newspapers.id = ?",
            NEWSPAPER_WITH_TOPIC_COLUMNS
        );
        let Some(row) = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        let NewspaperWithTopic { newspaper, topic } = newspaper_with_topic_from_row(&row)?;

        let sql = format!(
            "SELECT {} FROM redactors JOIN newspaper_redactors nr ON nr.redactor_id = redactors.id \
             WHERE nr.newspaper_id = ? ORDER BY redactors.username",
            REDACTOR_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(id).fetch_all(&self.pool).await?;
        let redactors = collect_rows(&rows, redactor_from_row)?;

        Ok(Some(NewspaperDetail {
            newspaper,
            topic,
            redactors,
        }))
    }

    /// Create a newspaper and assign its redactors in one transaction.
    pub async fn create_newspaper(&self, input: &NewspaperInput) -> Result<Newspaper, AppError> {
        let id = uuid::Uuid::new_v4().to_string();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO newspapers (
                id, title, title_folded, context, published_date, topic_id
            ) VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&input.title)
        .bind(fold_case(&input.title))
        .bind(&input.context)
        .bind(input.published_date)
        .bind(&input.topic_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| foreign_key_violation(e, "topicId", INVALID_TOPIC))?;

        assign_redactors(&mut tx, &id, &input.redactor_ids).await?;

        tx.commit().await?;

        Ok(newspaper_from_input(id, input))
    }

    /// Replace a newspaper's fields and its redactor set in one transaction.
    pub async fn update_newspaper(
        &self,
        id: &str,
        input: &NewspaperInput,
    ) -> Result<Newspaper, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"UPDATE newspapers
               SET title = ?, title_folded = ?, context = ?, published_date = ?, topic_id = ?
               WHERE id = ?"#,
        )
        .bind(&input.title)
        .bind(fold_case(&input.title))
        .bind(&input.context)
        .bind(input.published_date)
        .bind(&input.topic_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| foreign_key_violation(e, "topicId", INVALID_TOPIC))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Newspaper {} not found", id)));
        }

        sqlx::query("DELETE FROM newspaper_redactors WHERE newspaper_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        assign_redactors(&mut tx, id, &input.redactor_ids).await?;

        tx.commit().await?;

        Ok(newspaper_from_input(id.to_string(), input))
    }

    /// Delete a newspaper; its assignments go with it.
    pub async fn delete_newspaper(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM newspapers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Newspaper {} not found", id)));
        }

        Ok(())
    }

    /// Flip whether the redactor is assigned to the newspaper.
    ///
    /// Returns `true` when the redactor is assigned afterwards.
    pub async fn toggle_assignment(
        &self,
        newspaper_id: &str,
        redactor_id: &str,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query("SELECT 1 FROM newspapers WHERE id = ?")
            .bind(newspaper_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!(
                "Newspaper {} not found",
                newspaper_id
            )));
        }

        let removed =
            sqlx::query("DELETE FROM newspaper_redactors WHERE newspaper_id = ? AND redactor_id = ?")
                .bind(newspaper_id)
                .bind(redactor_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        let assigned = removed == 0;
        if assigned {
            sqlx::query("INSERT INTO newspaper_redactors (newspaper_id, redactor_id) VALUES (?, ?)")
                .bind(newspaper_id)
                .bind(redactor_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(assigned)
    }

    // ==================== REDACTOR OPERATIONS ====================

    /// Count redactors matching the filter.
    pub async fn count_redactors(&self, filter: &SearchFilter) -> Result<i64, AppError> {
        let sql = format!(
            "SELECT COUNT(*) AS count FROM redactors {}",
            filter.where_clause()
        );
        let row = filter.bind(sqlx::query(&sql)).fetch_one(&self.pool).await?;
        Ok(row.try_get("count")?)
    }

    /// List one page of redactors matching the filter, with their newspapers.
    pub async fn list_redactors(
        &self,
        filter: &SearchFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RedactorWithNewspapers>, AppError> {
        let sql = format!(
            "SELECT {} FROM redactors {} ORDER BY redactors.username LIMIT ? OFFSET ?",
            REDACTOR_COLUMNS,
            filter.where_clause()
        );
        let rows = filter
            .bind(sqlx::query(&sql))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        let redactors = collect_rows(&rows, redactor_from_row)?;

        let ids: Vec<String> = redactors.iter().map(|r| r.id.clone()).collect();
        let mut newspapers = self.newspapers_for_redactors(&ids).await?;

        Ok(redactors
            .into_iter()
            .map(|redactor| RedactorWithNewspapers {
                newspapers: newspapers.remove(&redactor.id).unwrap_or_default(),
                redactor,
            })
            .collect())
    }

    /// Up to `limit` featured redactors, by username.
    pub async fn featured_redactors(&self, limit: i64) -> Result<Vec<Redactor>, AppError> {
        let sql = format!(
            "SELECT {} FROM redactors WHERE is_featured = 1 ORDER BY redactors.username LIMIT ?",
            REDACTOR_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(limit).fetch_all(&self.pool).await?;

        collect_rows(&rows, redactor_from_row)
    }

    /// Get a redactor by ID.
    pub async fn get_redactor(&self, id: &str) -> Result<Option<Redactor>, AppError> {
        let sql = format!("SELECT {} FROM redactors WHERE id = ?", REDACTOR_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(redactor_from_row).transpose()?)
    }

    /// Get a redactor with their newspapers and each newspaper's topic.
    pub async fn get_redactor_detail(
        &self,
        id: &str,
    ) -> Result<Option<RedactorWithNewspapers>, AppError> {
        let Some(redactor) = self.get_redactor(id).await? else {
            return Ok(None);
        };

        let mut newspapers = self
            .newspapers_for_redactors(std::slice::from_ref(&redactor.id))
            .await?;

        Ok(Some(RedactorWithNewspapers {
            newspapers: newspapers.remove(&redactor.id).unwrap_or_default(),
            redactor,
        }))
    }

    /// Look a redactor up by login name.
    pub async fn find_redactor_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Redactor>, AppError> {
        let sql = format!("SELECT {} FROM redactors WHERE username = ?", REDACTOR_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(redactor_from_row).transpose()?)
    }

    /// Ids from `ids` that name no redactor.
    pub async fn missing_redactor_ids(&self, ids: &[String]) -> Result<Vec<String>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT id FROM redactors WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows = builder.build().fetch_all(&self.pool).await?;
        let found = rows
            .iter()
            .map(|row| row.try_get::<String, _>("id"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids
            .iter()
            .filter(|id| !found.contains(id))
            .cloned()
            .collect())
    }

    /// Create a redactor from a cleaned registration and an already hashed password.
    pub async fn create_redactor(
        &self,
        input: &NewRedactor,
        password_hash: &str,
    ) -> Result<Redactor, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let date_joined = Utc::now();

        sqlx::query(
            r#"INSERT INTO redactors (
                id, username, username_folded, first_name, last_name, password_hash,
                years_of_experience, is_featured, date_joined
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)"#,
        )
        .bind(&id)
        .bind(&input.username)
        .bind(fold_case(&input.username))
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(password_hash)
        .bind(input.years_of_experience)
        .bind(date_joined)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "username", USERNAME_TAKEN))?;

        Ok(Redactor {
            id,
            account: Account {
                username: input.username.clone(),
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                password_hash: password_hash.to_string(),
            },
            years_of_experience: input.years_of_experience,
            is_featured: false,
            date_joined,
        })
    }

    /// Update the experience and featured flag; the account itself is immutable here.
    pub async fn update_redactor(
        &self,
        id: &str,
        changes: &RedactorChanges,
    ) -> Result<Redactor, AppError> {
        let result =
            sqlx::query("UPDATE redactors SET years_of_experience = ?, is_featured = ? WHERE id = ?")
                .bind(changes.years_of_experience)
                .bind(changes.is_featured as i64)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Redactor {} not found", id)));
        }

        self.get_redactor(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Redactor {} not found", id)))
    }

    /// Delete a redactor; their assignments go with them.
    pub async fn delete_redactor(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM redactors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Redactor {} not found", id)));
        }

        Ok(())
    }

    /// Newspapers (with topics) for several redactors in a single query.
    async fn newspapers_for_redactors(
        &self,
        redactor_ids: &[String],
    ) -> Result<HashMap<String, Vec<NewspaperWithTopic>>, AppError> {
        let mut by_redactor: HashMap<String, Vec<NewspaperWithTopic>> = HashMap::new();
        if redactor_ids.is_empty() {
            return Ok(by_redactor);
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT nr.redactor_id, {} FROM newspaper_redactors nr \
             JOIN newspapers ON newspapers.id = nr.newspaper_id \
             JOIN topics ON topics.id = newspapers.topic_id \
             WHERE nr.redactor_id IN (",
            NEWSPAPER_WITH_TOPIC_COLUMNS
        ));
        let mut separated = builder.separated(", ");
        for id in redactor_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ");
        builder.push(NEWSPAPER_ORDER);

        let rows = builder.build().fetch_all(&self.pool).await?;
        for row in &rows {
            let redactor_id: String = row.try_get("redactor_id")?;
            by_redactor
                .entry(redactor_id)
                .or_default()
                .push(newspaper_with_topic_from_row(row)?);
        }

        Ok(by_redactor)
    }
}

/// Insert one assignment row per redactor inside an open transaction.
async fn assign_redactors(
    tx: &mut Transaction<'_, Sqlite>,
    newspaper_id: &str,
    redactor_ids: &[String],
) -> Result<(), AppError> {
    for redactor_id in redactor_ids {
        sqlx::query("INSERT INTO newspaper_redactors (newspaper_id, redactor_id) VALUES (?, ?)")
            .bind(newspaper_id)
            .bind(redactor_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                foreign_key_violation(e, "redactorIds", &invalid_redactor_choice(redactor_id))
            })?;
    }
    Ok(())
}

// Helper functions for row conversion

fn collect_rows<T>(
    rows: &[SqliteRow],
    convert: fn(&SqliteRow) -> Result<T, sqlx::Error>,
) -> Result<Vec<T>, AppError> {
    Ok(rows.iter().map(convert).collect::<Result<Vec<_>, _>>()?)
}

fn topic_from_row(row: &SqliteRow) -> Result<Topic, sqlx::Error> {
    Ok(Topic {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

fn newspaper_with_topic_from_row(row: &SqliteRow) -> Result<NewspaperWithTopic, sqlx::Error> {
    let topic_id: String = row.try_get("topic_id")?;
    Ok(NewspaperWithTopic {
        newspaper: Newspaper {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            context: row.try_get("context")?,
            published_date: row.try_get("published_date")?,
            topic_id: topic_id.clone(),
        },
        topic: Topic {
            id: topic_id,
            name: row.try_get("topic_name")?,
        },
    })
}

fn redactor_from_row(row: &SqliteRow) -> Result<Redactor, sqlx::Error> {
    let is_featured: i64 = row.try_get("is_featured")?;
    Ok(Redactor {
        id: row.try_get("id")?,
        account: Account {
            username: row.try_get("username")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            password_hash: row.try_get("password_hash")?,
        },
        years_of_experience: row.try_get("years_of_experience")?,
        is_featured: is_featured != 0,
        date_joined: row.try_get("date_joined")?,
    })
}

fn newspaper_from_input(id: String, input: &NewspaperInput) -> Newspaper {
    Newspaper {
        id,
        title: input.title.clone(),
        context: input.context.clone(),
        published_date: input.published_date,
        topic_id: input.topic_id.clone(),
    }
}

/// Report a reference to a row deleted in the meantime as a form error on `field`.
fn foreign_key_violation(err: sqlx::Error, field: &str, message: &str) -> AppError {
    let is_foreign_key = err
        .as_database_error()
        .map(|db| db.is_foreign_key_violation())
        .unwrap_or(false);

    if is_foreign_key {
        AppError::Validation(FieldErrors::single(field, message))
    } else {
        AppError::from(err)
    }
}

/// Report a unique-constraint violation as a form error on `field`.
fn unique_violation(err: sqlx::Error, field: &str, message: &str) -> AppError {
    let is_unique = err
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);

    if is_unique {
        AppError::Validation(FieldErrors::single(field, message))
    } else {
        AppError::from(err)
    }
}
