//! フレームストリームの走査
//!
//! ## フレームの Wire Format
//!
//! ```text
//! [thread_id: u32 LE (4 bytes)]
//! [code: u8 (1 byte)]
//! [length: u16 LE (2 bytes)]
//! [payload: length バイト]
//! ```
//!
//! Key フレーム以外のペイロードはすべて暗号文（`trace3-crypto` で復号）。
//! フレームはファイル順に厳密に並んでおり、シークは発生しない。

use serde::Serialize;

/// フレームヘッダーの長さ（thread_id: 4 + code: 1 + length: 2）
pub const FRAME_HEADER_LEN: usize = 7;

/// フレームの意味種別
///
/// wire 上は 1 バイト。値は ASCII のニーモニックに対応する
/// （62='>', 60='<', 71='G', ...）。未知の値は `Unknown` に落とし、
/// 行としては通常どおり出力する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCode {
    /// 62 '>': スコープ入場（インデント +1）
    Entry,
    /// 60 '<': スコープ退出（インデント -1、下限 0）
    Exit,
    /// 71 'G': グループ見出し
    Group,
    /// 68 'D': 通常データ（ANSI）
    Data,
    /// 69 'E': エラー行
    Error,
    /// 84 'T': 時刻コンテキスト更新（行としては出力されない）
    Time,
    /// 116 't': 日付コンテキスト更新（行としても出力される）
    Day,
    /// 78 'N': サービス再起動後の日付コンテキスト更新
    DayRestarted,
    /// 85 'U': UTF-8 エンコードのデータ
    Utf8,
    /// 75 'K': 鍵アナウンス（ペイロードは暗号文ではない）
    Key,
    /// 上記以外
    Unknown,
}

impl LineCode {
    /// wire 上の 1 バイトから種別を引く
    pub fn from_wire(byte: u8) -> Self {
        match byte {
            62 => LineCode::Entry,
            60 => LineCode::Exit,
            71 => LineCode::Group,
            68 => LineCode::Data,
            69 => LineCode::Error,
            84 => LineCode::Time,
            116 => LineCode::Day,
            78 => LineCode::DayRestarted,
            85 => LineCode::Utf8,
            75 => LineCode::Key,
            _ => LineCode::Unknown,
        }
    }

    /// ペイロードが暗号文かどうか（Key フレームだけが平文）
    pub fn payload_encrypted(&self) -> bool {
        !matches!(self, LineCode::Key)
    }
}

/// 走査中に 1 フレーム分だけ有効な生フレーム
///
/// ペイロードは元バッファへの借用で、コピーは行わない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame<'a> {
    /// フレーム先頭（ヘッダー第 1 バイト）のファイルオフセット
    pub offset: usize,
    /// 書き込み元スレッドの ID
    pub thread_id: u32,
    /// フレームの意味種別
    pub code: LineCode,
    /// ペイロード長（バイト）
    pub length: u16,
    /// ペイロード（復号前）
    pub payload: &'a [u8],
}

/// 走査の終わり方
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEnd {
    /// ちょうどフレーム境界でバッファが尽きた
    Clean,
    /// フレーム途中でバッファが尽きた（非致命。ここまでの結果は有効）
    Truncated {
        /// 壊れたフレームの先頭オフセット
        offset: usize,
        /// バッファに残っていたバイト数
        remaining: usize,
        /// そのフレームに必要だったバイト数
        needed: usize,
    },
}

/// フレームストリームの手動ループ用リーダー
///
/// ```text
/// let mut reader = FrameReader::new(buf, body_start);
/// while let Some(frame) = reader.next_frame() { ... }
/// match reader.ending() { ... }
/// ```
pub struct FrameReader<'a> {
    buf: &'a [u8],
    pos: usize,
    end: Option<FrameEnd>,
}

impl<'a> FrameReader<'a> {
    /// `body_start`（ヘッダー終端の直後）から走査を始めるリーダーを生成する
    pub fn new(buf: &'a [u8], body_start: usize) -> Self {
        FrameReader {
            buf,
            pos: body_start,
            end: None,
        }
    }

    /// 次のフレームを読む
    ///
    /// # 戻り値
    /// - `Some(frame)`: 完全なフレームが読めた
    /// - `None`: ストリームの終わり。`ending()` で終わり方を確認する
    pub fn next_frame(&mut self) -> Option<RawFrame<'a>> {
        if self.end.is_some() {
            return None;
        }

        let remaining = self.buf.len() - self.pos;
        if remaining == 0 {
            self.end = Some(FrameEnd::Clean);
            return None;
        }
        if remaining < FRAME_HEADER_LEN {
            // ヘッダーすら読めない端数バイト
            self.end = Some(FrameEnd::Truncated {
                offset: self.pos,
                remaining,
                needed: FRAME_HEADER_LEN,
            });
            return None;
        }

        let offset = self.pos;
        let thread_id =
            u32::from_le_bytes(self.buf[offset..offset + 4].try_into().unwrap());
        let code = LineCode::from_wire(self.buf[offset + 4]);
        let length =
            u16::from_le_bytes(self.buf[offset + 5..offset + 7].try_into().unwrap());

        let payload_start = offset + FRAME_HEADER_LEN;
        let payload_end = payload_start + length as usize;
        if payload_end > self.buf.len() {
            // 宣言された長さがバッファからはみ出す
            self.end = Some(FrameEnd::Truncated {
                offset,
                remaining,
                needed: FRAME_HEADER_LEN + length as usize,
            });
            return None;
        }

        self.pos = payload_end;
        Some(RawFrame {
            offset,
            thread_id,
            code,
            length,
            payload: &self.buf[payload_start..payload_end],
        })
    }

    /// 走査の終わり方を返す（`next_frame` が `None` を返すまでは `None`）
    pub fn ending(&self) -> Option<&FrameEnd> {
        self.end.as_ref()
    }

    /// 現在の読み取り位置（次のフレームの先頭オフセット）
    pub fn position(&self) -> usize {
        self.pos
    }
}
