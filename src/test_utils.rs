#[cfg(test)]
pub mod fixtures {
    use crate::{
        auth::Claims,
        models::domain::{Question, SeedQuestion, UserRole},
    };

    /// Four options with `answer` first.
    pub fn test_options(answer: &str) -> Vec<String> {
        vec![
            answer.to_string(),
            format!("not {}", answer),
            format!("maybe {}", answer),
            format!("never {}", answer),
        ]
    }

    /// Creates a stored question with a fixed id
    pub fn test_question(id: &str, topic: &str, text: &str, answer: &str) -> Question {
        Question {
            id: id.to_string(),
            question: text.to_string(),
            options: test_options(answer),
            answer: answer.to_string(),
            topic: topic.to_string(),
            created_at: None,
        }
    }

    pub fn test_seed(text: &str, answer: &str) -> SeedQuestion {
        SeedQuestion {
            question: text.to_string(),
            options: test_options(answer),
            answer: answer.to_string(),
        }
    }

    /// Claims as the auth middleware would attach them
    pub fn test_claims(uid: &str, role: UserRole) -> Claims {
        Claims {
            sub: uid.to_string(),
            email: format!("{}@example.com", uid),
            display_name: None,
            role,
            iat: 0,
            exp: 9999999999,
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_question_answer_is_an_option() {
        let question = test_question("q1", "Rust", "What is `Rc`?", "A counted pointer");
        assert!(question.options.contains(&question.answer));
        assert_eq!(question.options.len(), 4);
    }

    #[test]
    fn test_fixtures_claims() {
        let claims = test_claims("jane", crate::models::domain::UserRole::Admin);
        assert_eq!(claims.email, "jane@example.com");
        assert!(claims.is_admin());
    }
}
