//! Intrinsic name registry and the two list-valued intrinsic constraints.
//!
//! `DisableIntrinsic` holds bare names; `ControlIntrinsic` qualifies each name
//! with `+` (enable) or `-` (disable). Either list may scope a name to one
//! compiler tier as `c1:_name` or `c2:_name`. Entries are separated by `,` or
//! by a newline (repeated options accumulate line by line). Neither list has
//! a correction: an unknown name or tier is terminal in every mode.

use crate::core::context::ConstraintContext;
use crate::core::names::{CONTROL_INTRINSIC, DISABLE_INTRINSIC};
use crate::core::types::{ConstraintResult, FlagValue};

/// Longest prefix of an unknown token echoed back in a violation.
const MAX_REPORTED_TOKEN: usize = 63;

/// Compiler tiers a list entry may be scoped to.
const COMPILER_TIERS: &[&str] = &["c1", "c2"];

/// Lookup of recognized intrinsic identifiers.
pub trait IntrinsicRegistry {
    fn is_known(&self, name: &str) -> bool;
}

/// The compiled-in intrinsic table.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinIntrinsics;

impl IntrinsicRegistry for BuiltinIntrinsics {
    fn is_known(&self, name: &str) -> bool {
        KNOWN_INTRINSICS.contains(&name)
    }
}

const KNOWN_INTRINSICS: &[&str] = &[
    // java.lang.Object / System / Thread
    "_hashCode",
    "_getClass",
    "_clone",
    "_notify",
    "_notifyAll",
    "_identityHashCode",
    "_currentTimeMillis",
    "_nanoTime",
    "_arraycopy",
    "_currentThread",
    "_currentCarrierThread",
    "_onSpinWait",
    "_Reference_get",
    // java.lang.Math
    "_dabs",
    "_fabs",
    "_iabs",
    "_labs",
    "_dsin",
    "_dcos",
    "_dtan",
    "_datan2",
    "_dsqrt",
    "_dlog",
    "_dlog10",
    "_dpow",
    "_dexp",
    "_min",
    "_max",
    "_floorD",
    "_ceilD",
    "_rintD",
    "_fmaD",
    "_fmaF",
    "_dcopySign",
    "_fcopySign",
    "_dsignum",
    "_fsignum",
    "_addExactI",
    "_addExactL",
    "_subtractExactI",
    "_subtractExactL",
    "_multiplyExactI",
    "_multiplyExactL",
    "_multiplyHigh",
    "_negateExactI",
    "_negateExactL",
    // Integer / Long / Float / Double bit twiddling
    "_bitCount_i",
    "_bitCount_l",
    "_numberOfLeadingZeros_i",
    "_numberOfLeadingZeros_l",
    "_numberOfTrailingZeros_i",
    "_numberOfTrailingZeros_l",
    "_reverseBytes_i",
    "_reverseBytes_l",
    "_reverseBytes_c",
    "_reverseBytes_s",
    "_floatToRawIntBits",
    "_intBitsToFloat",
    "_doubleToRawLongBits",
    "_longBitsToDouble",
    "_isDigit",
    "_isLowerCase",
    "_isUpperCase",
    "_isWhitespace",
    // Strings
    "_compareToL",
    "_compareToU",
    "_compareToLU",
    "_compareToUL",
    "_equalsL",
    "_equalsU",
    "_indexOfL",
    "_indexOfU",
    "_indexOfUL",
    "_indexOfIL",
    "_indexOfIU",
    "_indexOfIUL",
    "_indexOfU_char",
    "_compressStringC",
    "_compressStringB",
    "_inflateStringC",
    "_inflateStringB",
    "_toBytesStringU",
    "_getCharsStringU",
    "_getCharStringU",
    "_putCharStringU",
    "_countPositives",
    "_encodeISOArray",
    "_encodeByteISOArray",
    "_encodeAsciiArray",
    // Arrays
    "_copyOf",
    "_copyOfRange",
    "_equalsB",
    "_equalsC",
    "_vectorizedMismatch",
    "_newArray",
    "_allocateInstance",
    // Crypto and checksums
    "_aescrypt_encryptBlock",
    "_aescrypt_decryptBlock",
    "_cipherBlockChaining_encryptAESCrypt",
    "_cipherBlockChaining_decryptAESCrypt",
    "_electronicCodeBook_encryptAESCrypt",
    "_electronicCodeBook_decryptAESCrypt",
    "_counterMode_AESCrypt",
    "_galoisCounterMode_AESCrypt",
    "_ghash_processBlocks",
    "_md5_implCompress",
    "_sha_implCompress",
    "_sha2_implCompress",
    "_sha5_implCompress",
    "_sha3_implCompress",
    "_digestBase_implCompressMB",
    "_updateCRC32",
    "_updateBytesCRC32",
    "_updateByteBufferCRC32",
    "_updateBytesCRC32C",
    "_updateDirectByteBufferCRC32C",
    "_updateBytesAdler32",
    "_updateByteBufferAdler32",
    // BigInteger
    "_multiplyToLen",
    "_squareToLen",
    "_mulAdd",
    "_montgomeryMultiply",
    "_montgomerySquare",
    "_bigIntegerRightShiftWorker",
    "_bigIntegerLeftShiftWorker",
    // Unsafe and fences
    "_compareAndSetInt",
    "_compareAndSetLong",
    "_compareAndSetReference",
    "_getAndAddInt",
    "_getAndAddLong",
    "_getAndSetInt",
    "_getAndSetLong",
    "_getAndSetReference",
    "_loadFence",
    "_storeFence",
    "_fullFence",
    "_Preconditions_checkIndex",
    "_Preconditions_checkLongIndex",
    "_blackhole",
];

/// Tokens of a delimited intrinsic list, whitespace-trimmed, empties dropped.
pub fn list_tokens(list: &str) -> impl Iterator<Item = &str> {
    list.split([',', '\n'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Split an optional `tier:` qualifier off an intrinsic name.
pub fn split_tier(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((tier, bare)) => (Some(tier), bare),
        None => (None, name),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListSyntax {
    Bare,
    Signed,
}

/// Every entry must name a known intrinsic.
pub fn disable_intrinsic(
    value: &str,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    check_intrinsic_list(DISABLE_INTRINSIC, value, ListSyntax::Bare, verbose, cx)
}

/// Every `+name`/`-name` entry must name a known intrinsic.
pub fn control_intrinsic(
    value: &str,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    check_intrinsic_list(CONTROL_INTRINSIC, value, ListSyntax::Signed, verbose, cx)
}

fn check_intrinsic_list(
    flag: &'static str,
    value: &str,
    syntax: ListSyntax,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    for token in list_tokens(value) {
        let name = match syntax {
            ListSyntax::Bare => token,
            ListSyntax::Signed => match token.strip_prefix(['+', '-']) {
                Some(name) => name,
                None => {
                    cx.notice(
                        verbose,
                        flag,
                        format!("failed to parse {token}. must start with +/-!"),
                    );
                    token
                }
            },
        };

        let (tier, name) = split_tier(name);
        if let Some(tier) = tier {
            if !COMPILER_TIERS.contains(&tier) {
                return cx.reject(
                    verbose,
                    flag,
                    FlagValue::List(value.to_string()),
                    format!("Unrecognized compiler tier detected in {flag}: {}", capped(tier)),
                );
            }
        }

        if !cx.intrinsics.is_known(name) {
            return cx.reject(
                verbose,
                flag,
                FlagValue::List(value.to_string()),
                format!("Unrecognized intrinsic detected in {flag}: {}", capped(name)),
            );
        }
    }
    Ok(())
}

fn capped(token: &str) -> String {
    token.chars().take(MAX_REPORTED_TOKEN).collect()
}
