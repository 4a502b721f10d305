use std::{future::Future, io, time::Duration};

use comms::{Msg, PairReceiver, PairSender};
use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    Result, TrainerErr,
    batch::{Batch, parse_batch},
    config::TrainerConfig,
    regressor::{IkRegressor, build_regressor},
    stimulus::Stimulus,
};

/// What happened during a single round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    /// The amount of training samples received.
    pub samples: usize,
    /// The epochs run this round, zero on prediction-only rounds.
    pub epochs: usize,
    /// The loss of the round's last epoch.
    pub loss: Option<f32>,
    /// The prediction sent back to the simulator.
    pub prediction: Vec<f32>,
}

/// The outcome of a whole session.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub rounds: usize,
    pub fit_rounds: usize,
    pub epochs: usize,
    pub last_loss: Option<f32>,
}

/// Drives the request, train and predict cycle against a single simulator peer.
pub struct Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    rx: PairReceiver<R>,
    tx: PairSender<W>,
    rx_buf: Vec<u8>,
    config: TrainerConfig,
    regressor: IkRegressor,
    stimulus: Option<Stimulus>,
    epoch: usize,
    training_set: Option<(Vec<Vec<f32>>, Vec<Vec<f32>>)>,
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new session over an already connected channel.
    ///
    /// # Arguments
    /// * `rx` - Receiving end of the simulator channel.
    /// * `tx` - Sending end of the simulator channel.
    /// * `config` - The trainer configuration.
    ///
    /// # Returns
    /// An error if the configuration is invalid.
    pub fn new(rx: PairReceiver<R>, tx: PairSender<W>, config: TrainerConfig) -> Result<Self> {
        config.validate()?;

        let regressor = build_regressor(&config)?;
        let stimulus = config
            .stimulus
            .as_ref()
            .map(|stimulus| Stimulus::new(stimulus, config.seed))
            .transpose()?;

        Ok(Self {
            rx,
            tx,
            rx_buf: Vec::new(),
            config,
            regressor,
            stimulus,
            epoch: 0,
            training_set: None,
        })
    }

    /// The amount of epochs trained so far.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// The samples of the last fitting round.
    pub fn training_set(&self) -> Option<(&[Vec<f32>], &[Vec<f32>])> {
        self.training_set
            .as_ref()
            .map(|(inputs, targets)| (inputs.as_slice(), targets.as_slice()))
    }

    /// Asks the simulator for a batch of samples, sending along fresh probe points when a
    /// stimulus is configured.
    ///
    /// # Returns
    /// The raw response text.
    pub async fn request_batch(&mut self) -> Result<String> {
        let stimulus = self.stimulus.as_mut().map(Stimulus::generate);
        let request = Msg::Sample(stimulus);
        let timeout = self.config.timeout();

        deadline("send request", timeout, self.tx.send(&request)).await?;

        let response: &str =
            deadline("receive samples", timeout, self.rx.recv_into(&mut self.rx_buf)).await?;

        Ok(response.to_owned())
    }

    /// Fits the regressor on the batch's training samples, unless the batch only asks for a
    /// prediction.
    ///
    /// # Returns
    /// The loss of the last epoch, `None` if nothing was fitted.
    pub fn train_step(&mut self, batch: &Batch) -> Result<Option<f32>> {
        if batch.is_prediction_only() {
            if self.training_set.is_none() {
                warn!(
                    epoch = self.epoch;
                    "prediction requested before any training samples arrived"
                );
            } else {
                debug!(epoch = self.epoch; "prediction only round, skipping fit");
            }
            return Ok(None);
        }

        let epochs = self.config.epochs_per_iteration.get();
        let (inputs, targets) = self
            .training_set
            .insert((batch.inputs().to_vec(), batch.targets().to_vec()));

        let losses = self
            .regressor
            .fit(inputs, targets, epochs, self.config.batch_size)?;

        for (i, loss) in losses.iter().enumerate() {
            debug!(epoch = self.epoch + i + 1, loss = *loss; "epoch finished");
        }

        self.epoch += epochs;
        Ok(losses.last().copied())
    }

    /// Predicts the output for `query` and sends it to the simulator for visualization.
    ///
    /// # Returns
    /// The prediction that was sent.
    pub async fn predict_and_respond(&mut self, query: &[f32]) -> Result<Vec<f32>> {
        let prediction = self.regressor.predict(query)?;
        let reply = Msg::Visualize(prediction.clone());

        deadline("send prediction", self.config.timeout(), self.tx.send(&reply)).await?;

        Ok(prediction)
    }

    /// Runs a single request, train and predict cycle.
    pub async fn round(&mut self) -> Result<RoundReport> {
        let epoch = self.epoch;

        let response = self.request_batch().await?;
        let batch = parse_batch(&response, self.config.input_dim, self.config.output_dim)?;
        let loss = self.train_step(&batch)?;
        let prediction = self.predict_and_respond(batch.query()).await?;

        Ok(RoundReport {
            samples: batch.len(),
            epochs: self.epoch - epoch,
            loss,
            prediction,
        })
    }

    /// Runs rounds until the epoch budget is exhausted.
    ///
    /// # Returns
    /// A summary of the session, or the first error that stopped it.
    pub async fn run(&mut self) -> Result<Summary> {
        let mut summary = Summary {
            rounds: 0,
            fit_rounds: 0,
            epochs: self.epoch,
            last_loss: None,
        };

        info!(
            num_epochs = self.config.num_epochs,
            epochs_per_iteration = self.config.epochs_per_iteration.get(),
            batch_size = self.config.batch_size.get();
            "starting session"
        );

        while self.epoch < self.config.num_epochs {
            let report = self.round().await?;

            summary.rounds += 1;
            if report.epochs > 0 {
                summary.fit_rounds += 1;
                summary.last_loss = report.loss;

                info!(
                    round = summary.rounds,
                    samples = report.samples,
                    epoch = self.epoch,
                    loss = report.loss.unwrap_or_default();
                    "round finished"
                );
            }
        }

        summary.epochs = self.epoch;
        info!(
            rounds = summary.rounds,
            fit_rounds = summary.fit_rounds,
            epochs = summary.epochs;
            "session finished"
        );

        Ok(summary)
    }
}

/// Bounds an I/O operation by `after`.
async fn deadline<F, T>(op: &'static str, after: Duration, fut: F) -> Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(ret) => Ok(ret?),
        Err(_) => Err(TrainerErr::Timeout { op, after }),
    }
}
