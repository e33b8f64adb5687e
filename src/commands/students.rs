use crate::api::Mode;
use crate::commands::{require_session, with_offline_notice, Out};
use crate::model::Student;
use crate::{App, Config, Result};
use chrono::Utc;
use std::fmt::Write;

/// Lists the students. Refreshes first; renders from the local cache either
/// way.
pub async fn students_list(config: Config, mode: Mode) -> Result<Out<Vec<Student>>> {
    let mut app = App::open(config, mode).await?;
    require_session(&app)?;
    app.refresh().await?;

    let students = app.store().students().to_vec();
    if students.is_empty() {
        return Ok(Out::new(
            with_offline_notice(&app, "No students registered yet".to_string()),
            students,
        ));
    }

    let mut message = String::new();
    for s in &students {
        writeln!(message, "{}  {:<6}  {}", s.id, s.nis, s.name)?;
    }
    Ok(Out::new(with_offline_notice(&app, message), students))
}

/// Adds a student and pushes the write intent.
pub async fn students_add(
    config: Config,
    mode: Mode,
    name: &str,
    nis: &str,
) -> Result<Out<Student>> {
    let mut app = App::open(config, mode).await?;
    require_session(&app)?;
    let student = app.add_student(name, nis, Utc::now()).await?;
    let message = format!("Added student '{}' as {}", student.name, student.id);
    Ok(Out::new(with_offline_notice(&app, message), student))
}

/// Replaces a student's record by id and pushes the write intent.
pub async fn students_update(
    config: Config,
    mode: Mode,
    id: &str,
    name: &str,
    nis: &str,
) -> Result<Out<Student>> {
    let mut app = App::open(config, mode).await?;
    require_session(&app)?;
    let student = Student::new(id, name, nis);
    app.update_student(student.clone()).await?;
    let message = format!("Updated student '{id}'");
    Ok(Out::new(with_offline_notice(&app, message), student))
}

/// Deletes a student by id and pushes the write intent. The student's past
/// transactions are kept.
pub async fn students_delete(config: Config, mode: Mode, id: &str) -> Result<Out<()>> {
    let mut app = App::open(config, mode).await?;
    require_session(&app)?;
    app.delete_student(id).await?;
    Ok(with_offline_notice(&app, format!("Deleted student '{id}'")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_students_crud() {
        let env = TestEnv::new().await;
        let mut app = env.app().await;
        app.login("admin", "admin123").await.unwrap();

        let out = students_add(env.config(), Mode::Test, "Dewi Anggraini", "2304")
            .await
            .unwrap();
        let id = out.structure().unwrap().id.clone();

        let out = students_update(env.config(), Mode::Test, &id, "Dewi A.", "2304")
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().name, "Dewi A.");

        let out = students_list(env.config(), Mode::Test).await.unwrap();
        assert!(out.structure().unwrap().iter().any(|s| s.id == id));

        students_delete(env.config(), Mode::Test, &id).await.unwrap();
        let out = students_list(env.config(), Mode::Test).await.unwrap();
        assert!(!out.structure().unwrap().iter().any(|s| s.id == id));
    }

    #[tokio::test]
    async fn test_update_unknown_student_fails() {
        let env = TestEnv::new().await;
        let mut app = env.app().await;
        app.login("admin", "admin123").await.unwrap();

        let result = students_update(env.config(), Mode::Test, "STD-404", "Ghost", "0").await;
        assert!(result.is_err());
    }
}
