//! Script engine: builder, classifier and parser for wallet scripts
//!
//! A script is an ordered list of byte-string elements. Content scripts end
//! with `OP_CONTENT`, preceded by their category bytes deepest first:
//!
//! ```text
//! payload..., depth-2 category, depth-1 category, OP_CONTENT
//! ```
//!
//! Reading from the end lets [`Classifier`] peel the categories off before
//! looking at the payload. Classification never fails: a short or malformed
//! element is a miss. [`Parser`] accessors return [`WalletError::NotAVariant`]
//! when the script does not classify as the requested variant.

use crate::category::*;
use crate::codec::*;
use crate::config::ScriptConfig;
use crate::constants::*;
use crate::constitution::Constitution;
use crate::error::{Result, WalletError};
use crate::types::{ByteString, Pkh};
use serde::{Deserialize, Serialize};

/// Ordered sequence of script elements
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<ByteString>", into = "Vec<ByteString>")]
pub struct Script {
    elements: Vec<ByteString>,
}

impl Script {
    /// Empty script, used as the `ta` of plain transfers
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap raw elements; fails when they cannot be put on the wire
    pub fn from_elements(elements: Vec<ByteString>) -> Result<Self> {
        if elements.len() > MAX_SCRIPT_ELEMENTS {
            return Err(WalletError::InvalidScriptFormat(format!(
                "{} elements exceed the limit of {}",
                elements.len(),
                MAX_SCRIPT_ELEMENTS
            )));
        }
        if let Some(i) = elements.iter().position(|e| e.len() > MAX_ELEMENT_LENGTH) {
            return Err(WalletError::InvalidScriptFormat(format!("element {} too long", i)));
        }
        Ok(Self { elements })
    }

    /// Start a new script of the given kind
    pub fn build(kind: ScriptKind) -> ScriptBuilder {
        ScriptBuilder {
            kind,
            config: ScriptConfig::default(),
            elements: Vec::new(),
        }
    }

    pub fn elements(&self) -> &[ByteString] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn is(&self) -> Classifier<'_> {
        self.is_with(&ScriptConfig::default())
    }

    pub fn is_with(&self, config: &ScriptConfig) -> Classifier<'_> {
        Classifier {
            elements: &self.elements,
            config: *config,
        }
    }

    pub fn parse(&self) -> Parser<'_> {
        self.parse_with(&ScriptConfig::default())
    }

    pub fn parse_with(&self, config: &ScriptConfig) -> Parser<'_> {
        Parser {
            is: self.is_with(config),
        }
    }

    /// Coarse kind, checked in PROPOSAL, THREAD, REWARD, VOTE order
    pub fn kind(&self) -> ScriptKind {
        self.is().kind()
    }

    /// Wire encoding: `u8 count || (u16 len || bytes)*`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        self.write_to(&mut out);
        out
    }

    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.elements.len() as u8);
        for element in &self.elements {
            out.extend_from_slice(&(element.len() as u16).to_be_bytes());
            out.extend_from_slice(element);
        }
    }

    pub fn serialized_len(&self) -> usize {
        1 + self.elements.iter().map(|e| 2 + e.len()).sum::<usize>()
    }

    /// Decode a wire-encoded script, rejecting trailing bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (script, used) = Self::read_from(bytes)?;
        if used != bytes.len() {
            return None;
        }
        Some(script)
    }

    /// Decode a script prefix, returning it with the number of bytes consumed
    pub(crate) fn read_from(bytes: &[u8]) -> Option<(Self, usize)> {
        let count = *bytes.first()? as usize;
        let mut pos = 1;
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            let len = decode_uint16(bytes.get(pos..pos + 2)?)? as usize;
            pos += 2;
            elements.push(bytes.get(pos..pos + len)?.to_vec());
            pos += len;
        }
        Some((Self { elements }, pos))
    }
}

impl TryFrom<Vec<ByteString>> for Script {
    type Error = WalletError;

    fn try_from(elements: Vec<ByteString>) -> Result<Self> {
        Script::from_elements(elements)
    }
}

impl From<Script> for Vec<ByteString> {
    fn from(script: Script) -> Self {
        script.elements
    }
}

/// Thread and proposal prices carried by a cost proposal.
/// A price of [`UNCHANGED_COST`] means the proposal leaves it as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalCosts {
    pub thread: i64,
    pub proposal: i64,
}

impl ProposalCosts {
    pub fn unchanged() -> Self {
        Self {
            thread: UNCHANGED_COST,
            proposal: UNCHANGED_COST,
        }
    }

    pub fn thread_price(&self) -> Option<u64> {
        (self.thread > 0).then_some(self.thread as u64)
    }

    pub fn proposal_price(&self) -> Option<u64> {
        (self.proposal > 0).then_some(self.proposal as u64)
    }
}

/// Append-only script under construction
#[derive(Debug, Clone)]
pub struct ScriptBuilder {
    kind: ScriptKind,
    config: ScriptConfig,
    elements: Vec<ByteString>,
}

impl ScriptBuilder {
    pub fn with_config(mut self, config: &ScriptConfig) -> Self {
        self.config = *config;
        self
    }

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    pub fn append(&mut self) -> Append<'_> {
        Append { builder: self }
    }

    pub fn finish(self) -> Script {
        Script {
            elements: self.elements,
        }
    }
}

/// Payload writers for a [`ScriptBuilder`]; each rejects malformed fields
/// before touching the builder
pub struct Append<'a> {
    builder: &'a mut ScriptBuilder,
}

impl<'a> Append<'a> {
    pub fn lock_script(self, pkh: &[u8]) -> Result<&'a mut ScriptBuilder> {
        self.expect_kind(ScriptKind::Empty, "lock script")?;
        let pkh = check_pkh(pkh, "public key hash")?;
        self.push(vec![
            vec![OP_DUP],
            vec![OP_HASH160],
            pkh.to_vec(),
            vec![OP_EQUALVERIFY],
            vec![OP_CHECKSIG],
        ])
    }

    pub fn unlock_script(self, signature: &[u8], public_key: &[u8]) -> Result<&'a mut ScriptBuilder> {
        self.expect_kind(ScriptKind::Empty, "unlock script")?;
        if !(MIN_SIGNATURE_LENGTH..=MAX_SIGNATURE_LENGTH).contains(&signature.len()) {
            return Err(WalletError::InvalidScriptFormat(format!(
                "signature length {} outside {}..={}",
                signature.len(),
                MIN_SIGNATURE_LENGTH,
                MAX_SIGNATURE_LENGTH
            )));
        }
        if public_key.len() != PUBLIC_KEY_LENGTH {
            return Err(WalletError::InvalidScriptFormat(format!(
                "public key length {} (expected {})",
                public_key.len(),
                PUBLIC_KEY_LENGTH
            )));
        }
        self.push(vec![signature.to_vec(), public_key.to_vec()])
    }

    pub fn application_proposal(self, nonce: u64, pkh: &[u8]) -> Result<&'a mut ScriptBuilder> {
        self.expect_kind(ScriptKind::Proposal, "application proposal")?;
        let mut elements = targetable_prefix(nonce, pkh)?;
        elements.push(vec![ProposalCategory::Application.as_byte()]);
        self.push_content(elements)
    }

    /// Costs of `0` or [`UNCHANGED_COST`] leave that price out of the script
    pub fn cost_proposal(
        self,
        nonce: u64,
        pkh: &[u8],
        thread_cost: i64,
        proposal_cost: i64,
    ) -> Result<&'a mut ScriptBuilder> {
        self.expect_kind(ScriptKind::Proposal, "cost proposal")?;
        let max = self.builder.config.max_unit_cost;
        let mut elements = targetable_prefix(nonce, pkh)?;
        for (cost, category) in [
            (thread_cost, CostCategory::ThreadPrice),
            (proposal_cost, CostCategory::ProposalPrice),
        ] {
            if cost == 0 || cost == UNCHANGED_COST {
                continue;
            }
            if cost < 0 || cost > max {
                return Err(WalletError::InvalidScriptFormat(format!(
                    "cost {} outside 1..={}",
                    cost, max
                )));
            }
            elements.push(encode_int64(cost));
            elements.push(vec![category.as_byte()]);
        }
        elements.push(vec![ProposalCategory::Costs.as_byte()]);
        self.push_content(elements)
    }

    pub fn constitution_proposal(
        self,
        nonce: u64,
        pkh: &[u8],
        constitution: &Constitution,
    ) -> Result<&'a mut ScriptBuilder> {
        self.expect_kind(ScriptKind::Proposal, "constitution proposal")?;
        let mut elements = targetable_prefix(nonce, pkh)?;
        elements.push(constitution.to_bytes());
        elements.push(vec![ProposalCategory::Constitution.as_byte()]);
        self.push_content(elements)
    }

    pub fn thread(self, nonce: u64, pkh: &[u8]) -> Result<&'a mut ScriptBuilder> {
        self.expect_kind(ScriptKind::Thread, "thread")?;
        let mut elements = targetable_prefix(nonce, pkh)?;
        elements.push(vec![ThreadCategory::Thread.as_byte()]);
        self.push_content(elements)
    }

    pub fn rethread(self, nonce: u64, pkh: &[u8], target: &[u8]) -> Result<&'a mut ScriptBuilder> {
        self.expect_kind(ScriptKind::Thread, "rethread")?;
        let mut elements = targetable_prefix(nonce, pkh)?;
        elements.push(check_pkh(target, "targeted thread hash")?.to_vec());
        elements.push(vec![ThreadCategory::Rethread.as_byte()]);
        self.push_content(elements)
    }

    pub fn reward(self, target: &[u8], vout: usize) -> Result<&'a mut ScriptBuilder> {
        self.expect_kind(ScriptKind::Reward, "reward")?;
        let target = check_pkh(target, "targeted content hash")?;
        if vout >= MAX_TX_OUTPUT {
            return Err(WalletError::InvalidScriptFormat(format!(
                "redistribution output {} outside 0..{}",
                vout, MAX_TX_OUTPUT
            )));
        }
        self.push_content(vec![target.to_vec(), vec![vout as u8]])
    }

    pub fn vote(self, target: &[u8], accepted: bool) -> Result<&'a mut ScriptBuilder> {
        self.expect_kind(ScriptKind::Vote, "vote")?;
        let target = check_pkh(target, "targeted proposal hash")?;
        let category = if accepted {
            VoteCategory::Accepted
        } else {
            VoteCategory::Declined
        };
        self.push_content(vec![target.to_vec(), vec![category.as_byte()]])
    }

    fn expect_kind(&self, kind: ScriptKind, what: &str) -> Result<()> {
        if !self.builder.elements.is_empty() {
            return Err(WalletError::InvalidScriptFormat(
                "script already holds a payload".to_string(),
            ));
        }
        if self.builder.kind != kind {
            return Err(WalletError::InvalidScriptFormat(format!(
                "{} cannot be appended to a {:?} script",
                what, self.builder.kind
            )));
        }
        Ok(())
    }

    /// Close a payload with the builder kind's depth-1 category and
    /// `OP_CONTENT`
    fn push_content(self, mut elements: Vec<ByteString>) -> Result<&'a mut ScriptBuilder> {
        let category = self.builder.kind.category().ok_or_else(|| {
            WalletError::InvalidScriptFormat("plain scripts carry no content category".to_string())
        })?;
        elements.push(vec![category]);
        elements.push(vec![OP_CONTENT]);
        self.push(elements)
    }

    fn push(self, elements: Vec<ByteString>) -> Result<&'a mut ScriptBuilder> {
        self.builder.elements.extend(elements);
        Ok(self.builder)
    }
}

fn check_pkh(bytes: &[u8], what: &str) -> Result<Pkh> {
    to_pkh(bytes).ok_or_else(|| {
        WalletError::InvalidScriptFormat(format!(
            "{} must be {} bytes, got {}",
            what,
            PKH_LENGTH,
            bytes.len()
        ))
    })
}

fn targetable_prefix(nonce: u64, pkh: &[u8]) -> Result<Vec<ByteString>> {
    if nonce > CONTENT_NONCE_MAX {
        return Err(WalletError::InvalidScriptFormat(format!(
            "content nonce {} exceeds {}",
            nonce, CONTENT_NONCE_MAX
        )));
    }
    let pkh = check_pkh(pkh, "content public key hash")?;
    Ok(vec![encode_uint32(nonce as u32), pkh.to_vec()])
}

fn is_opcode(element: &[u8], opcode: u8) -> bool {
    element == [opcode]
}

/// Read-only predicates over a script's elements
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    elements: &'a [ByteString],
    config: ScriptConfig,
}

impl<'a> Classifier<'a> {
    /// `[DUP, HASH160, pkh, EQUALVERIFY, CHECKSIG]`
    pub fn lock_script(&self) -> bool {
        match self.elements {
            [dup, hash160, pkh, equal, checksig] => {
                is_opcode(dup, OP_DUP)
                    && is_opcode(hash160, OP_HASH160)
                    && pkh.len() == PKH_LENGTH
                    && is_opcode(equal, OP_EQUALVERIFY)
                    && is_opcode(checksig, OP_CHECKSIG)
            }
            _ => false,
        }
    }

    /// `[signature, public_key]`
    pub fn unlock_script(&self) -> bool {
        match self.elements {
            [signature, public_key] => {
                (MIN_SIGNATURE_LENGTH..=MAX_SIGNATURE_LENGTH).contains(&signature.len())
                    && public_key.len() == PUBLIC_KEY_LENGTH
            }
            _ => false,
        }
    }

    pub fn content(&self) -> bool {
        self.proposal() || self.any_thread() || self.reward() || self.vote()
    }

    pub fn proposal(&self) -> bool {
        self.application_proposal() || self.cost_proposal() || self.constitution_proposal()
    }

    pub fn application_proposal(&self) -> bool {
        self.elements.len() == 5
            && self.targetable()
            && self.proposal_category() == Some(ProposalCategory::Application)
    }

    pub fn cost_proposal(&self) -> bool {
        matches!(self.elements.len(), 5 | 7 | 9)
            && self.targetable()
            && self.proposal_category() == Some(ProposalCategory::Costs)
            && self.cost_pairs().is_some()
    }

    pub fn constitution_proposal(&self) -> bool {
        self.elements.len() == 6
            && self.targetable()
            && self.proposal_category() == Some(ProposalCategory::Constitution)
            && Constitution::from_bytes(&self.elements[2]).is_some()
    }

    pub fn thread(&self) -> bool {
        self.elements.len() == 5
            && self.targetable()
            && self.thread_category() == Some(ThreadCategory::Thread)
    }

    pub fn rethread(&self) -> bool {
        self.elements.len() == 6
            && self.targetable()
            && self.elements[2].len() == PKH_LENGTH
            && self.thread_category() == Some(ThreadCategory::Rethread)
    }

    /// Thread or rethread
    pub fn any_thread(&self) -> bool {
        self.thread() || self.rethread()
    }

    /// `[target, vout, REWARD, CONTENT]`
    pub fn reward(&self) -> bool {
        self.elements.len() == 4
            && self.elements[0].len() == PKH_LENGTH
            && decode_uint8(&self.elements[1]).map_or(false, |v| (v as usize) < MAX_TX_OUTPUT)
            && self.ends_with(ScriptKind::Reward)
    }

    /// `[target, ACCEPTED|DECLINED, VOTE, CONTENT]`
    pub fn vote(&self) -> bool {
        self.vote_category().is_some()
    }

    pub fn accepted_vote(&self) -> bool {
        self.vote_category() == Some(VoteCategory::Accepted)
    }

    pub fn declined_vote(&self) -> bool {
        self.vote_category() == Some(VoteCategory::Declined)
    }

    pub fn kind(&self) -> ScriptKind {
        if self.proposal() {
            ScriptKind::Proposal
        } else if self.any_thread() {
            ScriptKind::Thread
        } else if self.reward() {
            ScriptKind::Reward
        } else if self.vote() {
            ScriptKind::Vote
        } else {
            ScriptKind::Empty
        }
    }

    fn vote_category(&self) -> Option<VoteCategory> {
        if self.elements.len() != 4 || self.elements[0].len() != PKH_LENGTH {
            return None;
        }
        VoteCategory::from_byte(self.sub_category(ScriptKind::Vote)?)
    }

    fn proposal_category(&self) -> Option<ProposalCategory> {
        ProposalCategory::from_byte(self.sub_category(ScriptKind::Proposal)?)
    }

    fn thread_category(&self) -> Option<ThreadCategory> {
        ThreadCategory::from_byte(self.sub_category(ScriptKind::Thread)?)
    }

    /// Depth-2 code right below `kind`'s category
    fn sub_category(&self, kind: ScriptKind) -> Option<u8> {
        let n = self.elements.len();
        if n < 3 || !self.ends_with(kind) {
            return None;
        }
        decode_uint8(&self.elements[n - 3])
    }

    /// Nonce and content pkh lead the script
    fn targetable(&self) -> bool {
        self.elements.len() >= 2
            && self.elements[0].len() == CONTENT_NONCE_LENGTH
            && self.elements[1].len() == PKH_LENGTH
    }

    /// Last element is `OP_CONTENT`, preceded by `kind`'s depth-1 category
    fn ends_with(&self, kind: ScriptKind) -> bool {
        let n = self.elements.len();
        match kind.category() {
            Some(code) => {
                n >= 2 && is_opcode(&self.elements[n - 1], OP_CONTENT) && is_opcode(&self.elements[n - 2], code)
            }
            None => false,
        }
    }

    /// Decode the `(cost, sub-category)` pairs of a cost proposal: at most one
    /// of each, thread price first, every cost within `1..=max_unit_cost`
    fn cost_pairs(&self) -> Option<ProposalCosts> {
        let n = self.elements.len();
        if n < 5 {
            return None;
        }
        let pairs = &self.elements[2..n - 3];
        if pairs.len() % 2 != 0 || pairs.len() > 4 {
            return None;
        }
        let mut costs = ProposalCosts::unchanged();
        let mut previous: Option<CostCategory> = None;
        for pair in pairs.chunks(2) {
            if pair[0].len() != COST_LENGTH {
                return None;
            }
            let cost = decode_int64(&pair[0])?;
            if cost <= 0 || cost > self.config.max_unit_cost {
                return None;
            }
            let category = CostCategory::from_byte(decode_uint8(&pair[1])?)?;
            if previous.is_some()
                && !(previous == Some(CostCategory::ThreadPrice)
                    && category == CostCategory::ProposalPrice)
            {
                return None;
            }
            match category {
                CostCategory::ThreadPrice => costs.thread = cost,
                CostCategory::ProposalPrice => costs.proposal = cost,
            }
            previous = Some(category);
        }
        Some(costs)
    }
}

/// Typed field extraction from classified scripts
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    is: Classifier<'a>,
}

impl<'a> Parser<'a> {
    pub fn pkh_from_lock_script(&self) -> Result<Pkh> {
        self.require(self.is.lock_script(), "lock script")?;
        Ok(self.pkh_at(2))
    }

    pub fn signature_from_unlock_script(&self) -> Result<ByteString> {
        self.require(self.is.unlock_script(), "unlock script")?;
        Ok(self.is.elements[0].clone())
    }

    pub fn public_key_from_unlock_script(&self) -> Result<ByteString> {
        self.require(self.is.unlock_script(), "unlock script")?;
        Ok(self.is.elements[1].clone())
    }

    /// Nonce of a thread or proposal
    pub fn content_nonce(&self) -> Result<u32> {
        self.require_targetable()?;
        decode_uint32(&self.is.elements[0]).ok_or(WalletError::NotAVariant("targetable content script"))
    }

    /// Content public-key hash of a thread or proposal
    pub fn content_pkh(&self) -> Result<Pkh> {
        self.require_targetable()?;
        Ok(self.pkh_at(1))
    }

    /// Hash targeted by a rethread, reward or vote
    pub fn target_pkh(&self) -> Result<Pkh> {
        if self.is.rethread() {
            Ok(self.pkh_at(2))
        } else if self.is.reward() || self.is.vote() {
            Ok(self.pkh_at(0))
        } else {
            Err(WalletError::NotAVariant("targeting content script"))
        }
    }

    pub fn proposal_costs(&self) -> Result<ProposalCosts> {
        self.require(self.is.cost_proposal(), "cost proposal")?;
        self.is.cost_pairs().ok_or(WalletError::NotAVariant("cost proposal"))
    }

    pub fn constitution(&self) -> Result<Constitution> {
        self.require(self.is.constitution_proposal(), "constitution proposal")?;
        Constitution::from_bytes(&self.is.elements[2]).ok_or(WalletError::NotAVariant("constitution proposal"))
    }

    pub fn redistribution_vout(&self) -> Result<u8> {
        self.require(self.is.reward(), "reward")?;
        Ok(self.is.elements[1][0])
    }

    pub fn vote_accepted(&self) -> Result<bool> {
        self.require(self.is.vote(), "vote")?;
        Ok(self.is.accepted_vote())
    }

    /// Decode into the tagged variant
    pub fn variant(&self) -> Result<ScriptVariant> {
        let is = &self.is;
        if is.lock_script() {
            return Ok(ScriptVariant::Lock {
                pkh: self.pkh_from_lock_script()?,
            });
        }
        if is.unlock_script() {
            return Ok(ScriptVariant::Unlock {
                signature: self.signature_from_unlock_script()?,
                public_key: self.public_key_from_unlock_script()?,
            });
        }
        if is.application_proposal() {
            return Ok(ScriptVariant::ApplicationProposal {
                nonce: self.content_nonce()?,
                pkh: self.content_pkh()?,
            });
        }
        if is.cost_proposal() {
            return Ok(ScriptVariant::CostProposal {
                nonce: self.content_nonce()?,
                pkh: self.content_pkh()?,
                costs: self.proposal_costs()?,
            });
        }
        if is.constitution_proposal() {
            return Ok(ScriptVariant::ConstitutionProposal {
                nonce: self.content_nonce()?,
                pkh: self.content_pkh()?,
                constitution: self.constitution()?,
            });
        }
        if is.thread() {
            return Ok(ScriptVariant::Thread {
                nonce: self.content_nonce()?,
                pkh: self.content_pkh()?,
            });
        }
        if is.rethread() {
            return Ok(ScriptVariant::Rethread {
                nonce: self.content_nonce()?,
                pkh: self.content_pkh()?,
                target: self.target_pkh()?,
            });
        }
        if is.reward() {
            return Ok(ScriptVariant::Reward {
                target: self.target_pkh()?,
                vout: self.redistribution_vout()?,
            });
        }
        if is.vote() {
            return Ok(ScriptVariant::Vote {
                target: self.target_pkh()?,
                accepted: self.vote_accepted()?,
            });
        }
        Err(WalletError::NotAVariant("known script"))
    }

    fn require(&self, matched: bool, variant: &'static str) -> Result<()> {
        if matched {
            Ok(())
        } else {
            Err(WalletError::NotAVariant(variant))
        }
    }

    fn require_targetable(&self) -> Result<()> {
        self.require(
            self.is.proposal() || self.is.any_thread(),
            "targetable content script",
        )
    }

    // Only called after a classifier has checked the width
    fn pkh_at(&self, index: usize) -> Pkh {
        let mut pkh = [0u8; PKH_LENGTH];
        pkh.copy_from_slice(&self.is.elements[index]);
        pkh
    }
}

/// Every script the wallet knows, with typed fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptVariant {
    Lock { pkh: Pkh },
    Unlock { signature: ByteString, public_key: ByteString },
    ApplicationProposal { nonce: u32, pkh: Pkh },
    CostProposal { nonce: u32, pkh: Pkh, costs: ProposalCosts },
    ConstitutionProposal { nonce: u32, pkh: Pkh, constitution: Constitution },
    Thread { nonce: u32, pkh: Pkh },
    Rethread { nonce: u32, pkh: Pkh, target: Pkh },
    Reward { target: Pkh, vout: u8 },
    Vote { target: Pkh, accepted: bool },
}

impl ScriptVariant {
    pub fn kind(&self) -> ScriptKind {
        match self {
            ScriptVariant::Lock { .. } | ScriptVariant::Unlock { .. } => ScriptKind::Empty,
            ScriptVariant::ApplicationProposal { .. }
            | ScriptVariant::CostProposal { .. }
            | ScriptVariant::ConstitutionProposal { .. } => ScriptKind::Proposal,
            ScriptVariant::Thread { .. } | ScriptVariant::Rethread { .. } => ScriptKind::Thread,
            ScriptVariant::Reward { .. } => ScriptKind::Reward,
            ScriptVariant::Vote { .. } => ScriptKind::Vote,
        }
    }

    pub fn encode(&self) -> Result<Script> {
        self.encode_with(&ScriptConfig::default())
    }

    pub fn encode_with(&self, config: &ScriptConfig) -> Result<Script> {
        let mut builder = Script::build(self.kind()).with_config(config);
        {
            let append = builder.append();
            match self {
                ScriptVariant::Lock { pkh } => append.lock_script(pkh)?,
                ScriptVariant::Unlock {
                    signature,
                    public_key,
                } => append.unlock_script(signature, public_key)?,
                ScriptVariant::ApplicationProposal { nonce, pkh } => {
                    append.application_proposal(*nonce as u64, pkh)?
                }
                ScriptVariant::CostProposal { nonce, pkh, costs } => {
                    append.cost_proposal(*nonce as u64, pkh, costs.thread, costs.proposal)?
                }
                ScriptVariant::ConstitutionProposal {
                    nonce,
                    pkh,
                    constitution,
                } => append.constitution_proposal(*nonce as u64, pkh, constitution)?,
                ScriptVariant::Thread { nonce, pkh } => append.thread(*nonce as u64, pkh)?,
                ScriptVariant::Rethread { nonce, pkh, target } => {
                    append.rethread(*nonce as u64, pkh, target)?
                }
                ScriptVariant::Reward { target, vout } => append.reward(target, *vout as usize)?,
                ScriptVariant::Vote { target, accepted } => append.vote(target, *accepted)?,
            };
        }
        Ok(builder.finish())
    }
}
