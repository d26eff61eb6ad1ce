//! Wire-format contract tests. The crate is bin-only (no `lib.rs`), the same
//! layout the teacher used, so these check the JSON shapes clients actually
//! see -- the success envelope, the judge poll response, and the session
//! gateway's ack/event envelopes -- without reaching into crate internals.
//! Collaborator and handler logic is covered by `#[cfg(test)]` modules next
//! to the code they test.

use serde_json::json;

#[cfg(test)]
mod success_envelope_tests {
    use super::*;

    /// Section 4.F / 6: every non-error response is `{statusCode, data, message, success}`.
    #[test]
    fn matches_the_documented_shape() {
        let body = json!({
            "statusCode": 200,
            "data": { "jobId": "3fa85f64-5717-4562-b3fc-2c963f66afa6" },
            "message": "ok",
            "success": true
        });

        assert!(body["statusCode"].is_number());
        assert_eq!(body["success"], true);
        assert!(body.get("data").is_some());
        assert!(body["message"].is_string());
    }
}

#[cfg(test)]
mod error_envelope_tests {
    use super::*;

    /// Section 4.F: error responses carry `success: false` and an `errors` list,
    /// distinct from the success envelope's `data` field.
    #[test]
    fn matches_the_documented_shape() {
        let body = json!({
            "statusCode": 404,
            "message": "problem not found",
            "success": false,
            "errors": ["problem not found"]
        });

        assert_eq!(body["success"], false);
        assert!(body["errors"].is_array());
        assert!(body.get("data").is_none());
    }
}

#[cfg(test)]
mod judge_poll_tests {
    use super::*;

    /// Section 4.D poll response: camelCase fields, `results` present even
    /// while queued (empty), `newlyPersisted` flips exactly once per submit job.
    #[test]
    fn queued_job_has_no_score_yet() {
        let poll = json!({
            "status": "queued",
            "mode": "submit",
            "score": null,
            "passed": null,
            "total": null,
            "results": [],
            "newlyPersisted": false
        });

        assert_eq!(poll["status"], "queued");
        assert!(poll["score"].is_null());
        assert_eq!(poll["results"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn completed_submit_job_reports_score_and_test_case_results() {
        let poll = json!({
            "status": "completed",
            "mode": "submit",
            "score": 300,
            "passed": 3,
            "total": 3,
            "results": [
                { "status": "AC", "input": "2 3", "expectedOutput": "5", "actualOutput": "5" }
            ],
            "newlyPersisted": true
        });

        assert_eq!(poll["status"], "completed");
        assert_eq!(poll["score"], 300);
        assert_eq!(poll["newlyPersisted"], true);
        assert_eq!(poll["results"][0]["status"], "AC");
    }
}

#[cfg(test)]
mod gateway_envelope_tests {
    use super::*;

    /// Section 4.E inbound frame: `{event, requestId, data}`.
    #[test]
    fn inbound_envelope_carries_an_event_name_and_request_id() {
        let frame = json!({
            "event": "findMatch",
            "requestId": "req-1",
            "data": {}
        });

        assert_eq!(frame["event"], "findMatch");
        assert!(frame["requestId"].is_string());
    }

    /// Section 4.E outbound ack: `{type:"ack", requestId, success, ...}`.
    #[test]
    fn ack_echoes_the_request_id_and_merges_extra_fields() {
        let ack = json!({
            "type": "ack",
            "requestId": "req-1",
            "success": true,
            "status": "matched",
            "roomId": "3fa85f64-5717-4562-b3fc-2c963f66afa6"
        });

        assert_eq!(ack["type"], "ack");
        assert_eq!(ack["requestId"], "req-1");
        assert_eq!(ack["success"], true);
        assert!(ack.get("roomId").is_some());
    }

    /// Section 4.E unsolicited push: `{type:"event", event, data}`.
    #[test]
    fn push_wraps_event_name_and_payload_separately_from_ack() {
        let push = json!({
            "type": "event",
            "event": "matchFound",
            "data": {
                "roomId": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
                "problem": { "id": "two-sum", "title": "Two Sum" },
                "startedAt": "2026-01-01T00:00:00Z",
                "endsAt": "2026-01-01T00:30:00Z"
            }
        });

        assert_eq!(push["type"], "event");
        assert_eq!(push["event"], "matchFound");
        assert_eq!(push["data"]["problem"]["id"], "two-sum");
    }

    /// Section 4.C: `matchFound` carries the problem itself, not just its id
    /// -- both paired sessions get it pushed directly (not over the room's
    /// broadcast channel, which neither has subscribed to yet).
    #[test]
    fn match_found_carries_the_full_problem_not_just_an_id() {
        let data = json!({
            "roomId": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "problem": {
                "id": "two-sum",
                "title": "Two Sum",
                "description": "...",
                "difficulty": "easy",
                "examples": [],
                "constraints": []
            },
            "startedAt": "2026-01-01T00:00:00Z",
            "endsAt": "2026-01-01T00:30:00Z"
        });

        assert!(data["problem"].is_object());
        assert!(data["problem"].get("canonicalSolution").is_none());
        assert!(data["problem"].get("testCases").is_none());
        assert!(data.get("startedAt").is_some());
        assert!(data.get("endsAt").is_some());
    }
}

#[cfg(test)]
mod solution_shape_tests {
    use super::*;

    /// Duel submissions (`contestId: null`) and contest submissions
    /// (`contestId` set) share the same `Solution` shape (section 4.A/4.F).
    #[test]
    fn duel_solution_has_no_contest_id() {
        let solution = json!({
            "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "userId": "3fa85f64-5717-4562-b3fc-2c963f66afa7",
            "contestId": null,
            "problemId": "two-sum",
            "solutionCode": "print(1)",
            "languageUsed": "python",
            "score": 100,
            "maxScore": 100
        });

        assert!(solution["contestId"].is_null());
        assert_eq!(solution["score"], solution["maxScore"]);
    }

    #[test]
    fn contest_solution_carries_its_contest_id() {
        let solution = json!({
            "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "userId": "3fa85f64-5717-4562-b3fc-2c963f66afa7",
            "contestId": "spring-cup",
            "problemId": "two-sum",
            "solutionCode": "print(1)",
            "languageUsed": "python",
            "score": 70,
            "maxScore": 100
        });

        assert_eq!(solution["contestId"], "spring-cup");
        assert!(solution["score"].as_i64().unwrap() < solution["maxScore"].as_i64().unwrap());
    }
}

#[cfg(test)]
mod leaderboard_shape_tests {
    use super::*;

    /// Section 4.F leaderboard rows: rank starts at 1 and is strictly
    /// increasing by the sorted (score desc) order the store produces.
    #[test]
    fn ranks_start_at_one_and_increase() {
        let rows = json!([
            { "rank": 1, "userId": "a", "username": "alice", "score": 300, "problemsSolved": 3 },
            { "rank": 2, "userId": "b", "username": "bob", "score": 200, "problemsSolved": 2 },
            { "rank": 3, "userId": "c", "username": "carol", "score": 50, "problemsSolved": 1 },
        ]);

        let ranks: Vec<i64> = rows.as_array().unwrap().iter().map(|r| r["rank"].as_i64().unwrap()).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }
}
