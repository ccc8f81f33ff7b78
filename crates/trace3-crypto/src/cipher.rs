//! trace3 独自ブロック暗号の実装
//!
//! TEA 系の 2 ワード 32 ラウンド構造を CFB 方式で流用した独自暗号。
//! trace3 ライターとビット単位で一致する必要があるため、移植上の注意点:
//!
//! - ラウンド内の算術はすべて 32 ビットのラップアラウンド
//! - 右シフトは算術シフト（`i32` の `>>`）。論理シフトでは一致しない
//! - チェイニングは平文ではなく「暗号文」バイトを IV に書き戻す
//!
//! ## ブロック処理の流れ
//!
//! ```text
//! IV = [IV_INIT[0] LE][IV_INIT[1] LE]   (8 バイト)
//!
//! ブロックごと (最大 8 バイト):
//!   1. IV の 2 ワードに 32 ラウンドのミキシング → キーストリーム 8 バイト
//!   2. 入力バイトと XOR → 出力バイト
//!   3. IV を暗号文バイトで上書き（復号時は入力、暗号化時は出力）
//!   4. 末尾の半端ブロックは残りバイト数だけ処理する
//! ```

/// ラウンド加算定数（黄金比、TEA と同じスケジュール）
const DELTA: i32 = 0x9E37_79B9_u32 as i32;

/// ミキシングのラウンド数
const ROUNDS: usize = 32;

/// 鍵ワードに XOR するホワイトニング定数
const KEY_WHITENING: [u32; 4] = [0x1319_8A2E, 0x0370_7344, 0xA409_3822, 0x299F_31D0];

/// IV の初期値（2 ワード、リトルエンディアンで 8 バイトに展開）
const IV_INIT: [u32; 2] = [0x243F_6A88, 0x85A3_08D3];

/// trace3 独自ブロック暗号
///
/// 1 フレームのペイロードにつき 1 インスタンスを使い捨てる。
/// IV はコンストラクタで固定値に初期化され、フレームを跨いで
/// チェイニングされることはない。
pub struct BlockCipher {
    /// ホワイトニング済みラウンド鍵（算術シフトのため i32 で保持）
    round_key: [i32; 4],
    /// IV バッファ。2 ワードとしても 8 バイトとしてもアクセスする
    iv: [u8; 8],
}

impl BlockCipher {
    /// 16 バイト鍵から暗号インスタンスを生成する
    pub fn new(key: &[u8; 16]) -> Self {
        let mut round_key = [0i32; 4];
        for (i, rk) in round_key.iter_mut().enumerate() {
            let word = u32::from_le_bytes(key[i * 4..i * 4 + 4].try_into().unwrap());
            *rk = (word ^ KEY_WHITENING[i]) as i32;
        }

        let mut iv = [0u8; 8];
        iv[0..4].copy_from_slice(&IV_INIT[0].to_le_bytes());
        iv[4..8].copy_from_slice(&IV_INIT[1].to_le_bytes());

        BlockCipher { round_key, iv }
    }

    /// 暗号文を復号する（in-place、長さは変わらない）
    ///
    /// 誤った鍵でも失敗はせず、文字化けしたバイト列を返すだけである。
    /// 完全性チェックはフォーマット側に存在しない。
    pub fn decrypt(&mut self, buf: &mut [u8]) {
        for block in buf.chunks_mut(8) {
            self.mix_iv();
            for (i, b) in block.iter_mut().enumerate() {
                let cipher_byte = *b;
                *b ^= self.iv[i];
                // チェイニングは暗号文バイト（= 復号時の入力）
                self.iv[i] = cipher_byte;
            }
        }
    }

    /// 平文を暗号化する（in-place、復号の正変換）
    ///
    /// ライター互換のテストフィクスチャ生成に使う。
    pub fn encrypt(&mut self, buf: &mut [u8]) {
        for block in buf.chunks_mut(8) {
            self.mix_iv();
            for (i, b) in block.iter_mut().enumerate() {
                *b ^= self.iv[i];
                // チェイニングは暗号文バイト（= 暗号化時の出力）
                self.iv[i] = *b;
            }
        }
    }

    /// IV の 2 ワードに 32 ラウンドのミキシングをかけ、結果を IV に書き戻す
    ///
    /// 書き戻された 8 バイトがそのままキーストリームになる。
    fn mix_iv(&mut self) {
        let mut v0 = i32::from_le_bytes(self.iv[0..4].try_into().unwrap());
        let mut v1 = i32::from_le_bytes(self.iv[4..8].try_into().unwrap());
        let [k0, k1, k2, k3] = self.round_key;

        let mut sum: i32 = 0;
        for _ in 0..ROUNDS {
            sum = sum.wrapping_add(DELTA);
            v0 = v0.wrapping_add(half_round(v1, sum, k0, k1));
            v1 = v1.wrapping_add(half_round(v0, sum, k2, k3));
        }

        self.iv[0..4].copy_from_slice(&v0.to_le_bytes());
        self.iv[4..8].copy_from_slice(&v1.to_le_bytes());
    }
}

/// ミキシングの半ラウンド
///
/// `v >> 5` が算術シフトであることが trace3 互換の要。
#[inline]
fn half_round(v: i32, sum: i32, ka: i32, kb: i32) -> i32 {
    ((v << 4).wrapping_add(ka)) ^ v.wrapping_add(sum) ^ ((v >> 5).wrapping_add(kb))
}
