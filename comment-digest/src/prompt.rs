//! Fixed Japanese instruction templates for the three oracle calls.
//!
//! Each template embeds an example of the exact JSON shape the parser
//! expects; the data payload is appended as compact JSON.

use serde::Serialize;

use crate::errors::OracleError;
use crate::oracle::{OracleRequest, PromptKind};

/// Shared system instruction: JSON only, no prose.
pub const SYSTEM_JSON_ONLY: &str =
    "あなたは指示されたJSONオブジェクトのみを出力します。解説、前置き、コードブロック記法は出力しません。";

pub const CLASSIFICATION_TEMPLATE: &str = r#"あなたは、講義アンケートのコメントを分析する専門のアナリストです。
これからJSON形式で渡されるコメントのリストを分析し、以下のルールに従って結果を一つのJSONオブジェクトとして出力してください。

# 全体のルール
- あなたの応答は、解説や前置きなしに、指定されたJSONオブジェクトのみにしてください。
- 各コメントは {"index": 番号, "comment": 本文} の形式で渡されます。結果では必ずこの "index" の番号を使ってください。
- 入力に存在しないインデックス番号を出力してはいけません。

# 分類ルール
各コメントに対して、以下の2つの分類を行ってください。
1.  **sentiment**: コメントの感情を分析し、以下のいずれかの数値を割り当ててください。
    - `0`: ポジティブ
    - `1`: ネガティブ
    - `2`: どちらでもない
2.  **topic**: コメントが何についての言及か、以下のカテゴリに分類してください。
    - `0`: 講義内容について
    - `1`: 講義資料について
    - `2`: 運営について
    - `3`: 講師について
    - `4`: チャットボットについて
    - `5`: その他

# 重要コメントの抽出ルール
コメント全体をレビューし、以下の基準の**いずれか1つ以上に合致する**コメントを「重要コメント」と判断し、そのインデックス番号をリストにまとめてください。
- 複数回（目安として3回以上）言及されている共通の改善点が含まれている。
- 緊急の対応が必要と思われる内容（例：システム障害、重大な誤り）が含まれている。
- 具体的な改善案が含まれている。

# 危険コメントの抽出ルール
- 誹謗中傷、人格攻撃、違法行為を示唆するような不適切な内容を含むコメントのインデックス番号をリストにまとめてください。

# 出力フォーマット
以下のJSON構造を厳守してください。"important_comments"と"dangerous_comments"の値は、インデックス番号の配列です。該当がない場合は空の配列にしてください。

{
  "classifications": [
    {"comment_index": 0, "sentiment": 0, "topic": 1},
    {"comment_index": 1, "sentiment": 1, "topic": 3}
  ],
  "important_comments": [1],
  "dangerous_comments": []
}

---
それでは、以下のコメントリストを分析してください。

【入力コメントリスト】
"#;

pub const SUMMARY_TEMPLATE: &str = r#"あなたは、顧客からのフィードバックを分析し、要点を簡潔にまとめるプロのテキストアナリストです。
これからポジティブなコメントのリストとネガティブなコメントのリストをJSON形式で渡します。

それぞれのリストについて、似たような意見をグループ化し、内容を要約してください。
要約は、それぞれの感情カテゴリ（ポジティブ・ネガティブ）ごとに、最大5個の箇条書きにまとめてください。

# 指示
1.  `positive_comments` のリストを読み込み、主な意見や感想を要約してください。
2.  `negative_comments` のリストを読み込み、主な不満点や改善要望を要約してください。
3.  要約は、具体的かつ簡潔にしてください。
4.  全体の意見を網羅し、特に多く言及されている点を優先してください。
5.  リストが空の場合、対応する要約は空の配列にしてください。
6.  以下のJSONフォーマットを厳守し、解説や前置きなしにJSONオブジェクトのみを出力してください。各配列の要素は5個以下です。

# 出力フォーマット
{
  "positive_summary": [
    "箇条書きの要約1",
    "箇条書きの要約2"
  ],
  "negative_summary": [
    "箇条書きの要約1",
    "箇条書きの要約2"
  ]
}

---
それでは、以下のコメントリストを分析してください。
"#;

pub const RANKING_TEMPLATE: &str = r#"あなたは、大量の顧客フィードバックを分析し、改善のためのアクションアイテムを優先順位付けする、経験豊富なプロダクトマネージャーです。

これから、重要だと判断されたコメントのリストをJSON形式で受け取ります。各コメントは {"index": 番号, "comment": 本文} の形式です。
あなたのタスクは、これらのコメントを総合的にレビューし、最も対応すべき優先度の高い課題をトップ5まで特定し、要約してランキング形式で出力することです。

# 分析と優先順位付けのルール
1.  **内容の理解とグルーピング**: まず、全てのコメントを読み、内容の似ているもの（例：「音声が途切れる」「音が聞こえない」）をグループ化します。
2.  **優先度の決定**: 以下の基準に従って、各グループの優先度を決定してください。
    * **優先度1 (最高)**: **緊急性の高い問題**。サービスの利用を妨げる致命的な障害や、重大な間違いの指摘（例：「動画が再生できない」「ログインできない」）。
    * **優先度2 (高)**: **頻出の意見・要望**。複数のユーザーから繰り返し指摘されている問題や改善案。
    * **優先度3 (中)**: **具体的な改善提案**。たとえ一人からの意見でも、具体的で実行可能な改善案。
    * **優先度4 (低)**: 上記以外の一般的な意見。
    * **優先度5**: 参考程度の意見。

# 出力フォーマット
- `priority`は1から5の整数、`summary`はその課題や提案を簡潔にまとめた一文です。
- `indices`には、その要約の根拠となった入力コメントの "index" 番号をリストで含めてください。入力に存在しない番号は使わないでください。
- 全体で最大5つの項目を、優先度の高い順に並べてください。
- あなたの応答は、解説や前置きなしに、JSONオブジェクトのみにしてください。

{
  "ranked_summary": [
    {
      "priority": 1,
      "summary": "動画の再生に関する技術的な問題が発生しており、緊急の対応が必要です。",
      "indices": [2, 18]
    },
    {
      "priority": 3,
      "summary": "演習問題の解答例を提供してほしいという具体的な要望があります。",
      "indices": [22]
    }
  ]
}

---
それでは、以下の重要コメントリストを分析し、優先順位をつけて要約してください。
【本番】
"#;

/// `{"index": i, "comment": "..."}` payload entry.
#[derive(Debug, Serialize)]
pub struct IndexedText<'a> {
    pub index: usize,
    pub comment: &'a str,
}

#[derive(Serialize)]
struct SummaryPayload<'a> {
    positive_comments: &'a [&'a str],
    negative_comments: &'a [&'a str],
}

/// Compact JSON for the prompt payload. A payload that cannot be encoded
/// fails the call before anything is sent.
fn compact<T: Serialize + ?Sized>(kind: PromptKind, value: &T) -> Result<String, OracleError> {
    serde_json::to_string(value).map_err(|e| OracleError::Transport {
        stage: kind.stage(),
        message: format!("encode {} payload: {e}", kind.as_str()),
    })
}

fn request<T: Serialize + ?Sized>(
    kind: PromptKind,
    template: &str,
    payload: &T,
) -> Result<OracleRequest, OracleError> {
    Ok(OracleRequest {
        kind,
        system: Some(SYSTEM_JSON_ONLY),
        prompt: format!("{template}{}", compact(kind, payload)?),
    })
}

pub fn classification_request(items: &[IndexedText<'_>]) -> Result<OracleRequest, OracleError> {
    request(PromptKind::Classification, CLASSIFICATION_TEMPLATE, items)
}

pub fn summary_request(positive: &[&str], negative: &[&str]) -> Result<OracleRequest, OracleError> {
    let payload = SummaryPayload {
        positive_comments: positive,
        negative_comments: negative,
    };
    request(PromptKind::Summary, SUMMARY_TEMPLATE, &payload)
}

pub fn ranking_request(items: &[IndexedText<'_>]) -> Result<OracleRequest, OracleError> {
    request(PromptKind::Ranking, RANKING_TEMPLATE, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Stage;

    #[test]
    fn classification_payload_is_compact_and_unescaped() {
        let req = classification_request(&[
            IndexedText {
                index: 0,
                comment: "とても分かりやすかった",
            },
            IndexedText {
                index: 1,
                comment: "資料が\"古い\"",
            },
        ])
        .unwrap();
        assert_eq!(req.kind, PromptKind::Classification);
        assert!(req.prompt.starts_with(CLASSIFICATION_TEMPLATE));
        assert!(req.prompt.ends_with(
            r#"[{"index":0,"comment":"とても分かりやすかった"},{"index":1,"comment":"資料が\"古い\""}]"#
        ));
    }

    #[test]
    fn summary_payload_names_both_lists() {
        let req = summary_request(&["楽しかった"], &[]).unwrap();
        assert!(req.prompt.ends_with(
            r#"{"positive_comments":["楽しかった"],"negative_comments":[]}"#
        ));
        assert_eq!(req.system, Some(SYSTEM_JSON_ONLY));
    }

    #[test]
    fn unencodable_payload_fails_before_the_call() {
        use std::collections::BTreeMap;

        let mut bad = BTreeMap::new();
        bad.insert((1u8, 2u8), "tuple keys are not JSON object keys");
        let err = request(PromptKind::Ranking, RANKING_TEMPLATE, &bad).unwrap_err();
        assert!(matches!(err, OracleError::Transport { stage: Stage::Ranking, .. }));
        assert_eq!(err.kind(), "transport");
    }

    #[test]
    fn templates_embed_their_reply_shape() {
        assert!(CLASSIFICATION_TEMPLATE.contains("\"important_comments\""));
        assert!(CLASSIFICATION_TEMPLATE.contains("\"dangerous_comments\""));
        assert!(SUMMARY_TEMPLATE.contains("\"negative_summary\""));
        assert!(RANKING_TEMPLATE.contains("\"ranked_summary\""));
    }
}
