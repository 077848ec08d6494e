use alloy::primitives::Address;
use econft_client::{Account, Erc721Client, TokenId};
use econft_devnet::{Devnet, DevnetConfig};
use eyre::ContextCompat;

pub(crate) const NAME: &str = "EcoNFT";
pub(crate) const SYMBOL: &str = "ECO";

/// Number of tokens minted to the owner when a context is built.
pub(crate) const INITIAL_MINT_COUNT: u64 = 3;

pub(crate) type Client = Erc721Client<Devnet>;

/// A freshly deployed collection with tokens `1..=3` minted to its owner.
pub(crate) struct Context {
    pub(crate) devnet: Devnet,
    /// Client acting as the collection owner, the only minter.
    pub(crate) owner: Client,
    /// Client acting as a collector.
    pub(crate) collector: Client,
    pub(crate) initial_mint: Vec<TokenId>,
}

impl Context {
    pub(crate) async fn new() -> eyre::Result<Self> {
        Self::with_config(DevnetConfig::default()).await
    }

    pub(crate) async fn with_config(
        config: DevnetConfig,
    ) -> eyre::Result<Self> {
        let devnet = Devnet::with_config(config);
        let owner =
            devnet.accounts().first().context("no dev accounts")?.clone();
        let collector =
            devnet.accounts().get(1).context("one dev account only")?.clone();

        let address = devnet.deploy_econft(&owner, NAME, SYMBOL).await?;
        let owner = Erc721Client::new(devnet.clone(), address, owner);
        let collector = owner.connect(collector);

        let mut initial_mint = Vec::new();
        for i in 1..=INITIAL_MINT_COUNT {
            let token_id = TokenId::from(i);
            send!(owner.mint(owner.account().address(), token_id))?;
            initial_mint.push(token_id);
        }

        Ok(Self { devnet, owner, collector, initial_mint })
    }

    pub(crate) fn owner_address(&self) -> Address {
        self.owner.account().address()
    }

    pub(crate) fn collector_address(&self) -> Address {
        self.collector.account().address()
    }

    /// A signing account that is neither the owner nor the collector.
    pub(crate) fn stranger(&self) -> eyre::Result<Account> {
        self.devnet.accounts().get(2).cloned().context("two dev accounts only")
    }
}

/// A token id that was not minted by the context.
pub(crate) fn random_token_id() -> TokenId {
    let num: u32 = rand::random();
    TokenId::from(u64::from(num) + 1000)
}
