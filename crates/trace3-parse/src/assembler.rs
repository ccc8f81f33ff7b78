//! レコードアセンブラの実装
//!
//! パースの 1 パスで下位クレートをすべて駆動する。構成は
//!
//! ```text
//! TraceParser
//!   ├── KeyChain    (trace3-crypto) - 鍵ローテーションの解決
//!   ├── BlockCipher (trace3-crypto) - フレームごとの復号（使い捨て）
//!   ├── FrameReader (trace3-frame)  - フレーム走査
//!   ├── decode_*    (trace3-text)   - テキスト化とカラータグ抽出
//!   └── FlowContext (trace3-flow)   - インデント / 時刻 / 日付
//! ```
//!
//! で、`KeyChain` と `FlowContext` は `parse` 呼び出しごとに新規に
//! 構築される。

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use trace3_crypto::{BlockCipher, KeyChain, DEFAULT_KEY};
use trace3_flow::FlowContext;
use trace3_frame::{extract_header, FrameEnd, FrameReader, LineCode, RawFrame};
use trace3_text::{decode_utf8, decode_windows_1252, extract_color, TextColor};

use crate::error::ParseError;
use crate::record::{ParsedTrace, TraceLine};

/// trace3 ファイルのパーサ
///
/// 設定はデフォルト鍵の差し替えだけ。パース中の状態（鍵チェイン、
/// フローコンテキスト）は呼び出しスコープに閉じるため、同じ
/// インスタンスで複数ファイルを並行にパースしても安全である。
pub struct TraceParser {
    /// Key レコード出現前のオフセット帯に適用する鍵
    default_key: [u8; 16],
}

impl TraceParser {
    /// 組み込みデフォルト鍵を使うパーサを生成する
    pub fn new() -> Self {
        TraceParser {
            default_key: DEFAULT_KEY,
        }
    }

    /// デフォルト鍵を差し替えたパーサを生成する
    ///
    /// ホストが設定で渡すセッション鍵を使う場合のコンストラクタ。
    pub fn with_default_key(default_key: [u8; 16]) -> Self {
        TraceParser { default_key }
    }

    /// バッファ全体をパースする
    ///
    /// # 戻り値
    /// ヘッダーと行の列。末尾フレームが壊れていた場合は、そこまでの
    /// 結果に `warning` を添えて返す（これが唯一の部分結果経路）。
    ///
    /// # エラー
    /// - `ParseError::UnrecognizedFile`: プリアンブル終端子がない
    pub fn parse(&self, buf: &[u8]) -> Result<ParsedTrace, ParseError> {
        let extracted = extract_header(buf)?;

        // パース 1 回分の専有状態
        let mut keys = KeyChain::with_default_key(self.default_key);
        let mut flow = FlowContext::new();
        let mut lines = Vec::new();

        let mut reader = FrameReader::new(buf, extracted.body_start);
        let mut line_index = 0usize;

        while let Some(frame) = reader.next_frame() {
            // 行番号は出力されない Time フレームも消費する
            let index = line_index;
            line_index += 1;

            if frame.code == LineCode::Key {
                // ペイロードはアンラップせずそのまま鍵として記録する
                keys.push(frame.offset, frame.payload);
            }

            let (content, text_color) = decode_content(&keys, &frame);

            match frame.code {
                LineCode::Time => {
                    // 時刻コンテキストの更新のみ。行は出力しない
                    flow.set_time(content);
                    continue;
                }
                LineCode::Day | LineCode::DayRestarted => {
                    // 日付コンテキストを更新した上で、行としても出力する
                    flow.set_date(content.clone());
                }
                _ => {}
            }

            let indent = flow.indent_for(frame.thread_id, frame.code);

            lines.push(TraceLine {
                line_index: index,
                file_offset: frame.offset,
                thread_id: frame.thread_id,
                code: frame.code,
                length: frame.length,
                content,
                indent,
                timestamp: String::from(flow.current_time()),
                date: String::from(flow.current_date()),
                text_color,
            });
        }

        let warning = match reader.ending() {
            Some(FrameEnd::Truncated {
                offset,
                remaining,
                needed,
            }) => Some(format!(
                "truncated frame at offset {}: needed {} bytes, {} remained",
                offset, needed, remaining
            )),
            _ => None,
        };

        Ok(ParsedTrace {
            header: extracted.header,
            lines,
            warning,
        })
    }
}

impl Default for TraceParser {
    fn default() -> Self {
        Self::new()
    }
}

/// フレームのペイロードをテキストと色に変換する
fn decode_content(keys: &KeyChain, frame: &RawFrame<'_>) -> (String, Option<TextColor>) {
    let decoded = if !frame.code.payload_encrypted() {
        // Key フレームのペイロードは暗号文ではない
        decode_windows_1252(frame.payload)
    } else if frame.payload.is_empty() {
        String::new()
    } else {
        let mut plain = frame.payload.to_vec();
        BlockCipher::new(&keys.select_key(frame.offset)).decrypt(&mut plain);
        if frame.code == LineCode::Utf8 {
            decode_utf8(&plain)
        } else {
            decode_windows_1252(&plain)
        }
    };

    match extract_color(&decoded) {
        Some((cleaned, color)) => (cleaned, Some(color)),
        None => (decoded, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec::Vec;

    // code 値（10進）: 62=Entry 60=Exit 68=Data 84=Time 116=Day
    //                  78=DayRestarted 85=Utf8 75=Key
    const ENTRY: u8 = 62;
    const EXIT: u8 = 60;
    const DATA: u8 = 68;
    const TIME: u8 = 84;
    const DAY: u8 = 116;
    const DAY_RESTARTED: u8 = 78;
    const UTF8: u8 = 85;
    const KEY: u8 = 75;

    /// 最小のプリアンブル + 終端子
    fn header_bytes() -> Vec<u8> {
        b"trace3 1.0\nMachine name: TEST\n.\r\n".to_vec()
    }

    /// 生フレームを書く（Key フレームと壊れたフレーム用）
    fn push_plain_frame(buf: &mut Vec<u8>, thread_id: u32, code: u8, payload: &[u8]) {
        buf.extend_from_slice(&thread_id.to_le_bytes());
        buf.push(code);
        buf.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        buf.extend_from_slice(payload);
    }

    /// テキストを指定鍵で暗号化してフレームとして書く（ライター互換）
    fn push_enc_frame(buf: &mut Vec<u8>, thread_id: u32, code: u8, text: &str, key: &[u8; 16]) {
        let mut payload = text.as_bytes().to_vec();
        BlockCipher::new(key).encrypt(&mut payload);
        push_plain_frame(buf, thread_id, code, &payload);
    }

    fn parse(buf: &[u8]) -> ParsedTrace {
        TraceParser::new().parse(buf).unwrap()
    }

    #[test]
    fn test_header_fields_in_result() {
        let trace = parse(&header_bytes());
        assert_eq!(trace.header.magic, "trace3 1.0");
        assert_eq!(trace.header.machine_name, "TEST");
        assert!(trace.lines.is_empty());
        assert!(trace.warning.is_none());
    }

    #[test]
    fn test_unrecognized_file_is_fatal() {
        let result = TraceParser::new().parse(b"definitely not a trace file");
        assert!(matches!(result, Err(ParseError::UnrecognizedFile(_))));
    }

    /// 行番号は Time フレームも消費する
    #[test]
    fn test_line_index_counts_time_frames() {
        let mut buf = header_bytes();
        push_enc_frame(&mut buf, 1, DATA, "first", &DEFAULT_KEY);
        push_enc_frame(&mut buf, 1, TIME, "08:00:00.000", &DEFAULT_KEY);
        push_enc_frame(&mut buf, 1, DATA, "second", &DEFAULT_KEY);

        let trace = parse(&buf);
        assert_eq!(trace.lines.len(), 2);
        assert_eq!(trace.lines[0].line_index, 0);
        assert_eq!(trace.lines[1].line_index, 2); // Time が 1 を消費した
        assert!(trace.lines.windows(2).all(|w| w[0].line_index < w[1].line_index));
    }

    /// Time フレームは出力されず、以降の行の timestamp に現れる
    #[test]
    fn test_time_context_propagation() {
        let mut buf = header_bytes();
        push_enc_frame(&mut buf, 1, DATA, "before", &DEFAULT_KEY);
        push_enc_frame(&mut buf, 2, TIME, "09:30:15.250", &DEFAULT_KEY);
        push_enc_frame(&mut buf, 1, DATA, "after", &DEFAULT_KEY);

        let trace = parse(&buf);
        assert_eq!(trace.lines.len(), 2);
        assert!(trace.lines.iter().all(|l| l.code != LineCode::Time));

        // Time 以前の行は空、以降はスレッドに関係なく直近の値
        assert_eq!(trace.lines[0].timestamp, "");
        assert_eq!(trace.lines[1].timestamp, "09:30:15.250");
    }

    /// Day 行は自身の内容を date に持ち、以降の行へ引き継がれる
    #[test]
    fn test_day_context_propagation() {
        let mut buf = header_bytes();
        push_enc_frame(&mut buf, 1, DAY, "2019-04-12", &DEFAULT_KEY);
        push_enc_frame(&mut buf, 1, DATA, "work", &DEFAULT_KEY);
        push_enc_frame(&mut buf, 1, DAY_RESTARTED, "2019-04-13", &DEFAULT_KEY);
        push_enc_frame(&mut buf, 1, DATA, "more", &DEFAULT_KEY);

        let trace = parse(&buf);
        assert_eq!(trace.lines.len(), 4);

        assert_eq!(trace.lines[0].code, LineCode::Day);
        assert_eq!(trace.lines[0].content, "2019-04-12");
        assert_eq!(trace.lines[0].date, "2019-04-12");

        assert_eq!(trace.lines[1].date, "2019-04-12");

        assert_eq!(trace.lines[2].code, LineCode::DayRestarted);
        assert_eq!(trace.lines[2].date, "2019-04-13");
        assert_eq!(trace.lines[3].date, "2019-04-13");
    }

    /// Entry, Entry, Data, Exit → [0, 1, 2, 1]、さらに Exit で 0
    #[test]
    fn test_indent_sequence() {
        let mut buf = header_bytes();
        push_enc_frame(&mut buf, 1, ENTRY, "f()", &DEFAULT_KEY);
        push_enc_frame(&mut buf, 1, ENTRY, "g()", &DEFAULT_KEY);
        push_enc_frame(&mut buf, 1, DATA, "inside", &DEFAULT_KEY);
        push_enc_frame(&mut buf, 1, EXIT, "g done", &DEFAULT_KEY);
        push_enc_frame(&mut buf, 1, EXIT, "f done", &DEFAULT_KEY);

        let trace = parse(&buf);
        let indents: Vec<u32> = trace.lines.iter().map(|l| l.indent).collect();
        assert_eq!(indents, [0, 1, 2, 1, 0]);
    }

    /// 対応する Entry のない Exit でもインデントは負にならない
    #[test]
    fn test_indent_never_negative() {
        let mut buf = header_bytes();
        push_enc_frame(&mut buf, 1, EXIT, "stray", &DEFAULT_KEY);
        push_enc_frame(&mut buf, 1, DATA, "still ok", &DEFAULT_KEY);

        let trace = parse(&buf);
        assert_eq!(trace.lines[0].indent, 0);
        assert_eq!(trace.lines[1].indent, 0);
    }

    /// 末尾の壊れたフレーム: 直前までの行 + warning、panic しない
    #[test]
    fn test_truncated_final_frame() {
        let mut buf = header_bytes();
        push_enc_frame(&mut buf, 1, DATA, "valid line", &DEFAULT_KEY);
        let bad_offset = buf.len();
        // length=100 を宣言して 4 バイトで切る
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.push(DATA);
        buf.extend_from_slice(&100u16.to_le_bytes());
        buf.extend_from_slice(&[0xAB; 4]);

        let trace = parse(&buf);
        assert_eq!(trace.lines.len(), 1);
        assert_eq!(trace.lines[0].content, "valid line");

        let warning = trace.warning.expect("truncation warning expected");
        assert!(warning.contains(&format!("offset {}", bad_offset)));
    }

    /// Key フレームで鍵が切り替わり、以降のフレームは新しい鍵で復号される
    #[test]
    fn test_key_rotation() {
        let new_key = [0x5Au8; 16];

        let mut buf = header_bytes();
        push_enc_frame(&mut buf, 1, DATA, "under default key", &DEFAULT_KEY);
        push_plain_frame(&mut buf, 1, KEY, &new_key);
        push_enc_frame(&mut buf, 1, DATA, "under new key", &new_key);

        let trace = parse(&buf);
        assert_eq!(trace.lines.len(), 3);
        assert_eq!(trace.lines[0].content, "under default key");
        assert_eq!(trace.lines[1].code, LineCode::Key);
        assert_eq!(trace.lines[2].content, "under new key");
    }

    /// 16 バイト未満の Key ペイロードは鍵として無視される（行は出る）
    #[test]
    fn test_short_key_payload_ignored() {
        let mut buf = header_bytes();
        push_plain_frame(&mut buf, 1, KEY, &[0x01; 8]);
        push_enc_frame(&mut buf, 1, DATA, "still default", &DEFAULT_KEY);

        let trace = parse(&buf);
        assert_eq!(trace.lines.len(), 2);
        assert_eq!(trace.lines[0].code, LineCode::Key);
        assert_eq!(trace.lines[1].content, "still default");
    }

    /// デフォルト鍵の差し替え（ホスト指定のセッション鍵）
    #[test]
    fn test_default_key_override() {
        let session_key = [0xC7u8; 16];

        let mut buf = header_bytes();
        push_enc_frame(&mut buf, 1, DATA, "session secret", &session_key);

        let trace = TraceParser::with_default_key(session_key)
            .parse(&buf)
            .unwrap();
        assert_eq!(trace.lines[0].content, "session secret");
    }

    /// 誤った鍵でもエラーにはならず、文字化けした行が出る
    #[test]
    fn test_wrong_key_garbles_without_error() {
        let other_key = [0x99u8; 16];

        let mut buf = header_bytes();
        push_enc_frame(&mut buf, 1, DATA, "plaintext marker", &other_key);

        let trace = parse(&buf); // デフォルト鍵で復号してしまう
        assert_eq!(trace.lines.len(), 1);
        assert_ne!(trace.lines[0].content, "plaintext marker");
        assert!(trace.warning.is_none());
    }

    /// カラータグはタグが除去され、色が行に付く
    #[test]
    fn test_color_tag_extraction() {
        let mut buf = header_bytes();
        push_enc_frame(&mut buf, 1, DATA, "foo'`I05`'bar", &DEFAULT_KEY);
        push_enc_frame(&mut buf, 1, DATA, "keep'`I1F`'tag", &DEFAULT_KEY);

        let trace = parse(&buf);
        assert_eq!(trace.lines[0].content, "foobar");
        assert_eq!(trace.lines[0].text_color, Some(TextColor::Purple));

        // 範囲外 (0x1F = 31) は原文のまま、色なし
        assert_eq!(trace.lines[1].content, "keep'`I1F`'tag");
        assert_eq!(trace.lines[1].text_color, None);
    }

    /// Utf8 コードのフレームは UTF-8 でデコードされる
    #[test]
    fn test_utf8_frame_decoding() {
        let mut buf = header_bytes();
        push_enc_frame(&mut buf, 1, UTF8, "ログ: 接続確立", &DEFAULT_KEY);
        // 同じバイト列でも Data コードなら Windows-1252 として化ける
        push_enc_frame(&mut buf, 1, DATA, "ログ", &DEFAULT_KEY);

        let trace = parse(&buf);
        assert_eq!(trace.lines[0].content, "ログ: 接続確立");
        assert_ne!(trace.lines[1].content, "ログ");
    }

    /// 長さ 0 のペイロードは空文字列の行になる
    #[test]
    fn test_empty_payload() {
        let mut buf = header_bytes();
        push_plain_frame(&mut buf, 3, DATA, &[]);

        let trace = parse(&buf);
        assert_eq!(trace.lines.len(), 1);
        assert_eq!(trace.lines[0].content, "");
        assert_eq!(trace.lines[0].length, 0);
        assert_eq!(trace.lines[0].thread_id, 3);
    }

    /// 未知のコード値も通常の行として出力される
    #[test]
    fn test_unknown_code_emitted() {
        let mut buf = header_bytes();
        push_enc_frame(&mut buf, 1, 99, "mystery", &DEFAULT_KEY);

        let trace = parse(&buf);
        assert_eq!(trace.lines[0].code, LineCode::Unknown);
        assert_eq!(trace.lines[0].content, "mystery");
    }

    /// 出力モデルは JSON にシリアライズできる（ホスト受け渡し用）
    #[test]
    fn test_result_serializes_to_json() {
        let mut buf = header_bytes();
        push_enc_frame(&mut buf, 1, DATA, "x'`I09`'y", &DEFAULT_KEY);

        let trace = parse(&buf);
        let json = serde_json::to_string(&trace).unwrap();
        assert!(json.contains("\"machine_name\":\"TEST\""));
        assert!(json.contains("\"content\":\"xy\""));
        assert!(json.contains("\"text_color\":\"red\""));
        assert!(json.contains("\"code\":\"data\""));
    }
}
