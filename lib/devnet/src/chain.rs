//! Blocks, transactions and the world state they change.
use std::collections::{HashMap, VecDeque};

use alloy::primitives::{keccak256, Address, Bytes, Log, TxHash};
use econft_client::Receipt;
use log::{debug, trace};
use tokio::sync::watch;

use crate::evm::{Contract, Env};

/// A transaction waiting in the mempool.
#[derive(Clone, Debug)]
struct Transaction {
    hash: TxHash,
    from: Address,
    to: Address,
    input: Bytes,
}

/// The effects of a successful call.
struct Outcome {
    output: Bytes,
    state: Option<Contract>,
    logs: Vec<Log>,
}

/// The state of the development network.
pub(crate) struct Chain {
    chain_id: u64,
    block: u64,
    automine: bool,
    nonces: HashMap<Address, u64>,
    contracts: HashMap<Address, Contract>,
    mempool: VecDeque<Transaction>,
    receipts: HashMap<TxHash, Receipt>,
    logs: Vec<(u64, Log)>,
    head: watch::Sender<u64>,
}

impl Chain {
    pub(crate) fn new(chain_id: u64, automine: bool) -> Self {
        let (head, _) = watch::channel(0);
        Self {
            chain_id,
            block: 0,
            automine,
            nonces: HashMap::new(),
            contracts: HashMap::new(),
            mempool: VecDeque::new(),
            receipts: HashMap::new(),
            logs: Vec::new(),
            head,
        }
    }

    pub(crate) fn block_number(&self) -> u64 {
        self.block
    }

    pub(crate) fn set_automine(&mut self, automine: bool) {
        self.automine = automine;
    }

    /// Notifications of newly mined blocks.
    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.head.subscribe()
    }

    /// Place `contract` at the next `CREATE` address of `deployer`.
    pub(crate) fn deploy(
        &mut self,
        deployer: Address,
        contract: Contract,
    ) -> Address {
        let nonce = self.next_nonce(deployer);
        let address = deployer.create(nonce);
        debug!("deployed contract at {address}");
        self.contracts.insert(address, contract);
        address
    }

    /// Execute a call against the latest state without changing it.
    pub(crate) fn call(
        &self,
        from: Address,
        to: Address,
        input: &[u8],
    ) -> Result<Bytes, Bytes> {
        trace!("call from {from} to {to}");
        self.execute(from, to, input).map(|outcome| outcome.output)
    }

    /// Accept a transaction into the mempool if it would succeed against the
    /// latest state. Mines it right away when automining.
    pub(crate) fn submit(
        &mut self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> Result<TxHash, Bytes> {
        self.execute(from, to, &input)?;

        let nonce = self.next_nonce(from);
        let mut preimage = Vec::with_capacity(8 + 20 + 8 + 20 + input.len());
        preimage.extend_from_slice(&self.chain_id.to_be_bytes());
        preimage.extend_from_slice(from.as_slice());
        preimage.extend_from_slice(&nonce.to_be_bytes());
        preimage.extend_from_slice(to.as_slice());
        preimage.extend_from_slice(&input);
        let hash = keccak256(&preimage);

        debug!("transaction {hash} from {from} entered the mempool");
        self.mempool.push_back(Transaction { hash, from, to, input });
        if self.automine {
            self.mine();
        }
        Ok(hash)
    }

    /// Mine every pending transaction into a new block, in submission order.
    pub(crate) fn mine(&mut self) -> u64 {
        self.block += 1;
        let block = self.block;
        let transactions: Vec<_> = self.mempool.drain(..).collect();
        let count = transactions.len();

        for tx in transactions {
            let receipt = match self.execute(tx.from, tx.to, &tx.input) {
                Ok(outcome) => {
                    if let Some(state) = outcome.state {
                        self.contracts.insert(tx.to, state);
                    }
                    let logs = outcome.logs.iter().cloned();
                    self.logs.extend(logs.map(|l| (block, l)));
                    Receipt {
                        tx_hash: tx.hash,
                        block_number: block,
                        status: true,
                        logs: outcome.logs,
                        revert: None,
                    }
                }
                Err(revert) => {
                    debug!("transaction {} reverted in block {block}", tx.hash);
                    Receipt {
                        tx_hash: tx.hash,
                        block_number: block,
                        status: false,
                        logs: Vec::new(),
                        revert: Some(revert),
                    }
                }
            };
            self.receipts.insert(tx.hash, receipt);
        }

        debug!("mined block {block} with {count} transaction(s)");
        self.head.send_replace(block);
        block
    }

    pub(crate) fn receipt(&self, tx_hash: &TxHash) -> Option<&Receipt> {
        self.receipts.get(tx_hash)
    }

    pub(crate) fn is_pending(&self, tx_hash: &TxHash) -> bool {
        self.mempool.iter().any(|tx| &tx.hash == tx_hash)
    }

    pub(crate) fn pending_transactions(&self) -> Vec<TxHash> {
        self.mempool.iter().map(|tx| tx.hash).collect()
    }

    /// Logs emitted by `address` in blocks from `from_block` on.
    pub(crate) fn logs(&self, address: Address, from_block: u64) -> Vec<Log> {
        self.logs
            .iter()
            .filter(|(block, log)| {
                *block >= from_block && log.address == address
            })
            .map(|(_, log)| log.clone())
            .collect()
    }

    fn next_nonce(&mut self, account: Address) -> u64 {
        let nonce = self.nonces.entry(account).or_default();
        let current = *nonce;
        *nonce += 1;
        current
    }

    /// Run a call on a copy of the callee, so that nothing changes unless
    /// the caller commits the outcome.
    fn execute(
        &self,
        from: Address,
        to: Address,
        input: &[u8],
    ) -> Result<Outcome, Bytes> {
        let Some(contract) = self.contracts.get(&to) else {
            // Calls to accounts without code succeed and do nothing.
            return Ok(Outcome {
                output: Bytes::new(),
                state: None,
                logs: Vec::new(),
            });
        };

        let mut contract = contract.clone();
        let mut env = Env::new(from, to, &self.contracts);
        let output = contract.execute(&mut env, input)?;
        Ok(Outcome { output, state: Some(contract), logs: env.into_logs() })
    }
}
